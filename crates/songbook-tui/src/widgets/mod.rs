pub mod filter_input;
pub mod pager;
pub mod pane_chrome;
pub mod status_bar;
pub mod toast;
