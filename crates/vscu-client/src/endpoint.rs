//! # Device Operations and Endpoint Registry
//!
//! The device API is a closed vocabulary of named operations, each bound to
//! a relative path and a default timeout. Encoding the vocabulary as an enum
//! makes an unregistered operation unrepresentable — a code/config mismatch
//! is a compile error, not a runtime outcome.
//!
//! The registry maps operating mode to a base URL. It is immutable after
//! construction. A mode without a configured base URL falls back to
//! production, and the fallback is logged at `warn`: sandbox credentials
//! silently hitting the production host is a correctness hazard the
//! operator must be able to see.

use std::time::Duration;

use url::Url;

use crate::config::DeviceMode;

/// A named remote action on the tax device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// One-time device initialization handshake.
    Initialize,
    /// Submit a sales document (invoices and credit notes).
    SubmitSale,
    /// Confirm a received purchase document.
    ConfirmPurchase,
    /// Fetch details of a previously submitted invoice.
    FetchInvoice,
    /// Fetch the list of purchase documents addressed to this taxpayer.
    FetchPurchases,
    /// Register or update an item master record.
    RegisterItem,
    /// Fetch the item master list.
    FetchItems,
    /// Register or update a customer master record.
    RegisterCustomer,
    /// Fetch a customer master record.
    FetchCustomer,
    /// Fetch the device code tables (packaging units, tax types, ...).
    FetchCodes,
    /// Fetch the branch list registered for this PIN.
    FetchBranches,
}

impl Operation {
    /// Relative API path for this operation.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Initialize => "initOscu",
            Self::SubmitSale => "saveTrnsSalesOsdc",
            Self::ConfirmPurchase => "insertTrnsPurchase",
            Self::FetchInvoice => "selectInvoiceDetails",
            Self::FetchPurchases => "selectTrnsPurchaseSalesList",
            Self::RegisterItem => "saveItem",
            Self::FetchItems => "selectItemList",
            Self::RegisterCustomer => "saveBhfCustomer",
            Self::FetchCustomer => "selectBhfCustomer",
            Self::FetchCodes => "selectCodeList",
            Self::FetchBranches => "selectBhfList",
        }
    }

    /// Stable snake_case name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::SubmitSale => "submit_sale",
            Self::ConfirmPurchase => "confirm_purchase",
            Self::FetchInvoice => "fetch_invoice",
            Self::FetchPurchases => "fetch_purchases",
            Self::RegisterItem => "register_item",
            Self::FetchItems => "fetch_items",
            Self::RegisterCustomer => "register_customer",
            Self::FetchCustomer => "fetch_customer",
            Self::FetchCodes => "fetch_codes",
            Self::FetchBranches => "fetch_branches",
        }
    }

    /// Default timeout bounding the full round trip for this operation.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(120)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Published production host for the device API.
pub const PRODUCTION_BASE_URL: &str = "https://etims.kra.go.ke/etims/api/";

/// Published sandbox host for the device API.
pub const SANDBOX_BASE_URL: &str = "https://etims-test.kra.go.ke/etims/api/";

/// Per-mode base URLs, read-only after construction.
///
/// Production is always configured; sandbox and local hosts are optional
/// and fall back to production (observably) when absent.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    production: Url,
    sandbox: Option<Url>,
    local: Option<Url>,
}

impl EndpointRegistry {
    /// Create a registry with only the production base URL configured.
    pub fn new(production: Url) -> Self {
        Self {
            production: ensure_trailing_slash(production),
            sandbox: None,
            local: None,
        }
    }

    /// Set the sandbox base URL.
    pub fn with_sandbox(mut self, url: Url) -> Self {
        self.sandbox = Some(ensure_trailing_slash(url));
        self
    }

    /// Set the local (simulation) base URL.
    pub fn with_local(mut self, url: Url) -> Self {
        self.local = Some(ensure_trailing_slash(url));
        self
    }

    /// Registry preloaded with the published production and sandbox hosts.
    pub fn published() -> Self {
        let production = Url::parse(PRODUCTION_BASE_URL).expect("published URL parses");
        let sandbox = Url::parse(SANDBOX_BASE_URL).expect("published URL parses");
        Self::new(production).with_sandbox(sandbox)
    }

    /// Resolve the full URL for an operation under the given mode.
    ///
    /// Falls back to the production base when the mode has no configured
    /// URL; the fallback is logged at `warn` so an operator can catch a
    /// sandbox/production mismatch.
    pub fn resolve(&self, mode: DeviceMode, operation: Operation) -> Url {
        self.base(mode)
            .join(operation.path())
            .expect("static operation paths join onto a base URL")
    }

    /// Operator-facing verification URL for a confirmed receipt signature,
    /// on the host the given mode resolves to.
    pub fn receipt_url(&self, mode: DeviceMode, signature: &str) -> Url {
        self.base(mode)
            .join(&format!("receipt/{signature}"))
            .expect("receipt path joins onto a base URL")
    }

    fn base(&self, mode: DeviceMode) -> &Url {
        let (configured, label) = match mode {
            DeviceMode::Production => (Some(&self.production), "production"),
            DeviceMode::Sandbox => (self.sandbox.as_ref(), "sandbox"),
            DeviceMode::Simulation => (self.local.as_ref(), "simulation"),
        };
        match configured {
            Some(url) => url,
            None => {
                tracing::warn!(
                    mode = label,
                    fallback = %self.production,
                    "no base URL configured for mode, falling back to production"
                );
                &self.production
            }
        }
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
