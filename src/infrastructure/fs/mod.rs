//! File system helpers

mod home;
mod local;

pub use home::{
    autodeploy_home_dir, expand_home, private_key_for, ssh_public_key, SshKeySource,
    AUTODEPLOY_TEST_HOME_VAR, PLACEHOLDER_SSH_KEY,
};
pub use local::{write_atomic, write_executable};
