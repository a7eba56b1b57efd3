pub mod folder;
pub mod snippet;
pub mod template;
pub mod ui_state;
pub mod workflow;
