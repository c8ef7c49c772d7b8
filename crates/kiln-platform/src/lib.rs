pub mod clipboard;
pub mod paths;
pub mod shell;

pub use clipboard::Clipboard;
pub use paths::{config_dir, data_dir, ensure_dirs, instance_socket, state_file, UserDataDir};
pub use shell::{is_openable_url, open_path, open_url, show_in_folder};
