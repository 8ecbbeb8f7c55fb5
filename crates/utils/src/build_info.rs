use serde::Serialize;

/// Version and provenance of the running binary, stamped by `build.rs`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub git_branch: &'static str,
    pub build_timestamp: &'static str,
}

macro_rules! stamped {
    ($name:expr) => {
        match option_env!($name) {
            Some(v) => v,
            None => "unknown",
        }
    };
}

pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    git_commit: stamped!("FOLIO_GIT_COMMIT"),
    git_branch: stamped!("FOLIO_GIT_BRANCH"),
    build_timestamp: stamped!("FOLIO_BUILD_TIMESTAMP"),
};

impl BuildInfo {
    /// `User-Agent` value for outbound HTTP calls (mail providers, reCAPTCHA).
    pub fn user_agent(&self) -> String {
        format!("folio/{} ({})", self.version, self.git_commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_carries_crate_version() {
        let ua = BUILD_INFO.user_agent();
        assert!(ua.starts_with("folio/"));
        assert!(ua.contains(env!("CARGO_PKG_VERSION")));
    }
}
