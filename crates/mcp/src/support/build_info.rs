#![forbid(unsafe_code)]

pub(crate) fn build_profile_label() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

pub(crate) fn build_git_sha() -> Option<&'static str> {
    option_env!("NS_GIT_SHA").and_then(|v| {
        let v = v.trim();
        if v.is_empty() { None } else { Some(v) }
    })
}

pub(crate) fn build_fingerprint() -> String {
    // Semver build metadata: `<version>+git.<sha>.<profile>`, kept compact
    // so clients can log it verbatim.
    let version = crate::SERVER_VERSION;
    let profile = build_profile_label();
    match build_git_sha() {
        Some(sha) => format!("{version}+git.{sha}.{profile}"),
        None => format!("{version}+{profile}"),
    }
}
