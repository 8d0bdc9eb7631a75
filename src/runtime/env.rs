use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    pub(crate) fn home_dir_impl(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_env_var_reads_process_environment() {
        // cargo exports package metadata to the test process
        assert_eq!(
            RealRuntime.env_var("CARGO_PKG_NAME").as_deref(),
            Ok("sidekick")
        );
        assert_eq!(
            RealRuntime.env_var("SIDEKICK_TEST_UNSET_VARIABLE"),
            Err(std::env::VarError::NotPresent)
        );
    }
}
