//! UI components

pub mod description;
pub mod grid;
pub mod help_dialog;
pub mod layout;
pub mod notice_dialog;
pub mod quit_dialog;
pub mod screen;

pub use description::DescriptionBar;
pub use grid::GridComponent;
pub use help_dialog::HelpDialog;
pub use layout::{centered_popup, MainLayout};
pub use notice_dialog::NoticeDialog;
pub use quit_dialog::QuitDialog;
pub use screen::{draw_main_screen, MainRenderContext};
