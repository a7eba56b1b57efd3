pub mod flags;
pub mod folder_favorites;
pub mod folders;
pub mod snippets;
pub mod templates;
pub mod transfer;
pub mod ui_state;
pub mod workflows;
