use crate::domain::model::ModelError;

/// Validated publish input.
///
/// The only way to build one is [`PublishRequest::parse`], so holding a value means the
/// title is non-empty and the price is a non-negative integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishRequest {
    owner: String,
    title: String,
    description: String,
    price: u64,
}

impl PublishRequest {
    /// Validates raw publish input as it arrives from the transport layer.
    ///
    /// `price` is the decimal text of a non-negative integer. Surrounding whitespace is
    /// tolerated; signs, decimals and anything else are rejected.
    pub fn parse(
        owner: &str,
        title: &str,
        description: &str,
        price: &str,
    ) -> Result<Self, ModelError> {
        if owner.trim().is_empty() {
            return Err(ModelError::EmptyOwner);
        }
        if title.trim().is_empty() {
            return Err(ModelError::EmptyTitle);
        }

        let digits = price.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError::InvalidPrice(price.to_string()));
        }
        let price = digits
            .parse::<u64>()
            .map_err(|_| ModelError::InvalidPrice(price.to_string()))?;

        Ok(Self {
            owner: owner.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            price,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub(crate) fn into_parts(self) -> (String, String, String, u64) {
        (self.owner, self.title, self.description, self.price)
    }
}
