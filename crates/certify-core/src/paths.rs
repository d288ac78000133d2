//! Network share path rewriting.
//!
//! Folder paths are stored against the production share. Development
//! machines mount the same share under another drive, so paths are
//! rewritten before use unless running in production.

/// Rewrites the production share prefix to the development one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    pub production: bool,
    pub production_prefix: String,
    pub development_prefix: String,
}

impl PathRewrite {
    /// Return the usable form of `path`.
    ///
    /// Outside production the prefix is always swapped; `force` swaps it
    /// in production too.
    #[must_use]
    pub fn safe_path(&self, path: &str, force: bool) -> String {
        if (!self.production || force) && !self.production_prefix.is_empty() {
            path.replace(&self.production_prefix, &self.development_prefix)
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(production: bool) -> PathRewrite {
        PathRewrite {
            production,
            production_prefix: "S:\\".into(),
            development_prefix: "Z:\\".into(),
        }
    }

    #[test]
    fn development_always_rewrites() {
        assert_eq!(
            rewrite(false).safe_path("S:\\Reports\\2024", false),
            "Z:\\Reports\\2024"
        );
    }

    #[test]
    fn production_rewrites_only_when_forced() {
        let rw = rewrite(true);
        assert_eq!(rw.safe_path("S:\\Reports", false), "S:\\Reports");
        assert_eq!(rw.safe_path("S:\\Reports", true), "Z:\\Reports");
    }

    #[test]
    fn unrelated_paths_are_untouched() {
        assert_eq!(rewrite(false).safe_path("C:\\Temp", false), "C:\\Temp");
    }
}
