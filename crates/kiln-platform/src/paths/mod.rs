mod ensure;
mod resolve;

pub use ensure::ensure_dirs;
pub use resolve::{config_dir, data_dir, instance_socket, state_file, UserDataDir};
