use url::Url;

/// Adres do udostępnienia: baza + fragment `#...` ze stanem filtrów
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub base: String,
    pub fragment: String,
}

impl Address {
    /// Akceptuje pełny link (z fragmentem albo bez), link bez schematu
    /// z `#` albo sam fragment.
    pub fn parse(link: &str, default_base: &str) -> Self {
        let link = link.trim();
        if let Ok(mut url) = Url::parse(link) {
            let fragment = url.fragment().unwrap_or("").to_string();
            url.set_fragment(None);
            return Self { base: url.into(), fragment };
        }
        match link.split_once('#') {
            Some((base, fragment)) => {
                let base = if base.is_empty() { default_base } else { base };
                Self { base: base.to_string(), fragment: fragment.to_string() }
            }
            None => Self { base: default_base.to_string(), fragment: link.to_string() },
        }
    }

    pub fn set_fragment(&mut self, fragment: String) {
        self.fragment = fragment;
    }

    /// Pełny adres, jak w pasku przeglądarki
    pub fn href(&self) -> String {
        if self.fragment.is_empty() {
            self.base.clone()
        } else {
            format!("{}#{}", self.base, self.fragment)
        }
    }
}
