pub mod header;
pub mod help_overlay;
pub mod log_panel;
pub mod lookup_form;
pub mod song_table;
pub mod tag_form;
