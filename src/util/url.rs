/// Joins a path to a base URL, tolerating a missing trailing `/` on the base.
pub fn join(base: &reqwest::Url, path: &str) -> reqwest::Url {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    base.join(path.trim_start_matches('/'))
        .expect("a valid URL joined with a relative path is a valid URL")
}
