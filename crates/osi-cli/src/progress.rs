//! Download feedback on the terminal.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use osi_store::RemoteSource;

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";

/// Wraps a [`RemoteSource`] with a spinner shown while each request runs.
///
/// The spinner draws to stderr and stays hidden when stderr is not a terminal.
#[derive(Debug, Clone)]
pub struct ProgressSource<S> {
    inner: S,
    enabled: bool,
}

impl<S: RemoteSource> ProgressSource<S> {
    pub fn new(inner: S, enabled: bool) -> Self {
        Self { inner, enabled }
    }
}

impl<S: RemoteSource> RemoteSource for ProgressSource<S> {
    fn fetch(&self, url: &str) -> osi_store::Result<Vec<u8>> {
        if !self.enabled {
            return self.inner.fetch(url);
        }
        let spinner = create_spinner(&format!("downloading {url}"));
        let result = self.inner.fetch(url);
        spinner.finish_and_clear();
        result
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use osi_store::{OfflineSource, StoreError};

    struct Echo;

    impl RemoteSource for Echo {
        fn fetch(&self, url: &str) -> osi_store::Result<Vec<u8>> {
            Ok(url.as_bytes().to_vec())
        }
    }

    #[test]
    fn forwards_results_and_errors() {
        for enabled in [false, true] {
            let source = ProgressSource::new(Echo, enabled);
            assert_eq!(source.fetch("https://a/b").unwrap(), b"https://a/b".to_vec());

            let offline = ProgressSource::new(OfflineSource, enabled);
            let err = offline.fetch("https://a/b").unwrap_err();
            assert!(matches!(err, StoreError::Offline { .. }));
        }
    }
}
