pub mod header;
pub mod help_overlay;
pub mod song_list;
