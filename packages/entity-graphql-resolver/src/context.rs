//! Per-request scope handed to the resolver and on to the store.

/// Entity whose rows are only visible to the logged-in customer.
pub const CUSTOMER_ENTITY: &str = "customer";

/// Target entity of the relations that scope a query by sales channel.
pub const SALES_CHANNEL_ENTITY: &str = "sales_channel";

/// Who is asking and through which channel.
///
/// Every part is optional. Without a sales channel queries are not scoped by
/// channel; without a customer the `customer` entity cannot be queried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub sales_channel_id: Option<String>,
    pub customer_id: Option<String>,
    pub language_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sales_channel(mut self, id: impl Into<String>) -> Self {
        self.sales_channel_id = Some(id.into());
        self
    }

    pub fn with_customer(mut self, id: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    pub fn with_language(mut self, id: impl Into<String>) -> Self {
        self.language_id = Some(id.into());
        self
    }
}
