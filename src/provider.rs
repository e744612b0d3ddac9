//! Webmail provider profiles and discovery from mailbox domains.
//!
//! A [`ProviderProfile`] bundles every provider-specific constant the session
//! needs: landing URL, lookup-field selector, frame identifiers, message-row
//! selector. Markup changes on the provider side are absorbed here and never
//! touch the extractor or the retry loop.
//!
//! # Example
//!
//! ```
//! use webmail_otp::provider::{ProviderRegistry, discover_provider};
//!
//! // Use built-in discovery
//! assert_eq!(discover_provider("yopmail.com").unwrap().name, "yopmail");
//!
//! // Create a custom registry for your application
//! let mut registry = ProviderRegistry::with_defaults();
//! registry.register("tempmail.test", webmail_otp::ProviderProfile {
//!     name: "tempmail".into(),
//!     base_url: "https://tempmail.test/".into(),
//!     ..webmail_otp::ProviderProfile::yopmail()
//! });
//! assert!(registry.discover("tempmail.test").is_some());
//! ```

use std::collections::HashMap;

/// Selector and URL constants for one webmail provider.
///
/// All selectors are CSS. Selector lists (comma-separated) are allowed where
/// the provider renders the same control under different markup variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Short provider name, used in logging.
    pub name: String,
    /// Landing page URL.
    pub base_url: String,
    /// Selector for the mailbox lookup field on the landing page.
    pub lookup_field: String,
    /// Selector for the control that opens the inbox for the entered mailbox.
    pub open_inbox_button: String,
    /// Selector for the inbox refresh control. Its absence is tolerated.
    pub refresh_button: String,
    /// Selector for the iframe hosting the message list.
    pub inbox_frame: String,
    /// Selector for the iframe hosting the opened message body.
    pub message_frame: String,
    /// Selector for a message row inside the inbox frame. The first match in
    /// display order is the most recent message.
    pub message_row: String,
}

impl ProviderProfile {
    /// Profile for yopmail.com, the default disposable-mailbox provider.
    #[must_use]
    pub fn yopmail() -> Self {
        Self {
            name: "yopmail".into(),
            base_url: "https://yopmail.com/".into(),
            lookup_field: "input#login".into(),
            open_inbox_button: "button[title='Check Inbox'], button.sbut".into(),
            refresh_button: "button#refresh, button[class*='refresh']".into(),
            inbox_frame: "iframe#ifinbox".into(),
            message_frame: "iframe#ifmail".into(),
            message_row: "div.m, div[class*='mail']".into(),
        }
    }
}

/// Domains served by the built-in yopmail profile.
const YOPMAIL_DOMAINS: &[&str] = &[
    "yopmail.com",
    "yopmail.fr",
    "yopmail.net",
    "cool.fr.nf",
    "jetable.fr.nf",
    "courriel.fr.nf",
    "moncourrier.fr.nf",
    "monemail.fr.nf",
    "monmail.fr.nf",
];

/// Looks up the built-in profile for a mailbox domain.
///
/// Returns `None` for domains without a built-in profile; use a
/// [`ProviderRegistry`] to register your own.
#[must_use]
pub fn discover_provider(domain: &str) -> Option<ProviderProfile> {
    let domain = domain.to_lowercase();
    YOPMAIL_DOMAINS
        .contains(&domain.as_str())
        .then(ProviderProfile::yopmail)
}

/// A customizable registry for webmail provider discovery.
///
/// This allows you to add custom domain-to-profile mappings at runtime, in
/// addition to (or overriding) the built-in defaults.
///
/// # Example
///
/// ```
/// use webmail_otp::provider::ProviderRegistry;
/// use webmail_otp::ProviderProfile;
///
/// let mut registry = ProviderRegistry::with_defaults();
/// registry.register("disposable.test", ProviderProfile {
///     name: "disposable".into(),
///     base_url: "https://disposable.test/".into(),
///     ..ProviderProfile::yopmail()
/// });
///
/// assert_eq!(registry.discover("disposable.test").unwrap().name, "disposable");
/// assert_eq!(registry.discover("yopmail.com").unwrap().name, "yopmail"); // Built-in
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    custom: HashMap<String, ProviderProfile>,
    use_defaults: bool,
}

impl ProviderRegistry {
    /// Creates an empty registry without built-in defaults.
    ///
    /// Use [`Self::with_defaults`] if you want the yopmail mappings included.
    #[must_use]
    pub fn new() -> Self {
        Self {
            custom: HashMap::new(),
            use_defaults: false,
        }
    }

    /// Creates a registry that includes the built-in provider mappings.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            custom: HashMap::new(),
            use_defaults: true,
        }
    }

    /// Registers a custom domain-to-profile mapping.
    ///
    /// Custom mappings take precedence over built-in defaults. Domains are
    /// matched case-insensitively.
    pub fn register(&mut self, domain: impl Into<String>, profile: ProviderProfile) {
        self.custom.insert(domain.into().to_lowercase(), profile);
    }

    /// Registers multiple domain-to-profile mappings at once.
    pub fn register_many<D>(&mut self, mappings: impl IntoIterator<Item = (D, ProviderProfile)>)
    where
        D: Into<String>,
    {
        for (domain, profile) in mappings {
            self.register(domain, profile);
        }
    }

    /// Resolves the provider profile for a mailbox domain.
    ///
    /// Resolution order: custom mappings, then built-in defaults (if enabled).
    #[must_use]
    pub fn discover(&self, domain: &str) -> Option<ProviderProfile> {
        let domain = domain.to_lowercase();

        if let Some(profile) = self.custom.get(&domain) {
            return Some(profile.clone());
        }

        if self.use_defaults {
            return discover_provider(&domain);
        }

        None
    }
}
