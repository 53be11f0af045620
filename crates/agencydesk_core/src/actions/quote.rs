//! Quote and invoice intents.

use super::{
    finish, owned, require_identity, validate_email, validate_name, ActionError, ActionResult,
    Services,
};
use crate::constants::INVOICE_DUE_DAYS;
use crate::format::date_label;
use crate::identity::SessionProvider;
use crate::models::quote::{CreateQuoteRequest, LineItem, Quote, QuoteKind, QuotePatch, QuoteStatus};
use crate::models::Deleted;
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Upper bound for `tax_rate_bps` (100%).
const MAX_TAX_RATE_BPS: u32 = 10_000;

fn normalize(mut quote: Quote) -> Quote {
    quote.issued_label = date_label(quote.issue_date);
    quote
}

fn validate_line_items(items: &[LineItem]) -> Result<(), ActionError> {
    for (index, item) in items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(ActionError::ValidationFailed(format!(
                "line item {} needs a description",
                index + 1
            )));
        }
        if item.quantity == 0 {
            return Err(ActionError::ValidationFailed(format!(
                "line item {} quantity must be at least 1",
                index + 1
            )));
        }
        if item.unit_price_cents < 0 {
            return Err(ActionError::ValidationFailed(format!(
                "line item {} price must not be negative",
                index + 1
            )));
        }
    }
    Ok(())
}

fn validate_tax_rate(rate: Option<u32>) -> Result<(), ActionError> {
    match rate {
        Some(rate) if rate > MAX_TAX_RATE_BPS => Err(ActionError::ValidationFailed(
            "tax rate must be between 0 and 100%".to_string(),
        )),
        _ => Ok(()),
    }
}

pub fn list_quotes(
    services: &Services,
    session: &dyn SessionProvider,
) -> ActionResult<Vec<Quote>> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        let rows = services.db.quotes.list_for_owner(&identity.user_id)?;
        Ok(rows.into_iter().map(normalize).collect())
    })();
    finish("list_quotes", result)
}

pub fn create_quote(
    services: &Services,
    session: &dyn SessionProvider,
    request: &CreateQuoteRequest,
) -> ActionResult<Quote> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        validate_name("client name", &request.client_name)?;
        validate_email(&request.client_email)?;
        validate_line_items(&request.line_items)?;
        validate_tax_rate(request.tax_rate_bps)?;
        if let (Some(issue), Some(due)) = (request.issue_date, request.due_date) {
            if due < issue {
                return Err(ActionError::ValidationFailed(
                    "due date must not be before the issue date".to_string(),
                ));
            }
        }
        let quote = Quote::from_request(&identity.user_id, request, Utc::now());
        Ok(normalize(services.db.quotes.create(&quote)?))
    })();
    finish("create_quote", result)
}

/// Edit a quote or invoice, including status changes valid for its kind.
pub fn update_quote(
    services: &Services,
    session: &dyn SessionProvider,
    quote_id: &str,
    patch: &QuotePatch,
) -> ActionResult<Quote> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        if let Some(name) = &patch.client_name {
            validate_name("client name", name)?;
        }
        if let Some(email) = &patch.client_email {
            validate_email(email)?;
        }
        if let Some(items) = &patch.line_items {
            validate_line_items(items)?;
        }
        validate_tax_rate(patch.tax_rate_bps)?;

        let existing = owned(services.db.quotes.get(quote_id)?, &identity, |q| {
            q.owner_id.as_str()
        })?;
        if let Some(status) = patch.status {
            if !status.allowed_for(existing.kind) {
                return Err(ActionError::ValidationFailed(format!(
                    "{} status '{}' is not allowed",
                    existing.kind, status
                )));
            }
        }
        let updated = services
            .db
            .quotes
            .update(quote_id, patch, Utc::now())?
            .ok_or(ActionError::NotFound)?;
        Ok(normalize(updated))
    })();
    finish("update_quote", result)
}

/// Issue an invoice from an accepted quote.
///
/// The invoice copies the client and line items, links back through
/// `source_quote_id`, and is due [`INVOICE_DUE_DAYS`] after today.
pub fn convert_to_invoice(
    services: &Services,
    session: &dyn SessionProvider,
    quote_id: &str,
) -> ActionResult<Quote> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        let quote = owned(services.db.quotes.get(quote_id)?, &identity, |q| {
            q.owner_id.as_str()
        })?;
        if quote.kind != QuoteKind::Quote {
            return Err(ActionError::ValidationFailed(format!(
                "{} is already an invoice",
                quote.number
            )));
        }
        if quote.status != QuoteStatus::Accepted {
            return Err(ActionError::ValidationFailed(format!(
                "{} must be accepted before it can be invoiced",
                quote.number
            )));
        }

        let now = Utc::now();
        let today = now.date_naive();
        let invoice = Quote {
            id: Uuid::new_v4().to_string(),
            kind: QuoteKind::Invoice,
            number: String::new(),
            status: QuoteStatus::Draft,
            issue_date: today,
            due_date: Some(today + Duration::days(INVOICE_DUE_DAYS)),
            source_quote_id: Some(quote.id.clone()),
            created_at: now,
            updated_at: now,
            ..quote
        };
        Ok(normalize(services.db.quotes.create(&invoice)?))
    })();
    finish("convert_to_invoice", result)
}

pub fn delete_quote(
    services: &Services,
    session: &dyn SessionProvider,
    quote_id: &str,
) -> ActionResult<Deleted> {
    let result = (|| -> Result<_, ActionError> {
        let identity = require_identity(session)?;
        owned(services.db.quotes.get(quote_id)?, &identity, |q| {
            q.owner_id.as_str()
        })?;
        if !services.db.quotes.delete(quote_id)? {
            return Err(ActionError::NotFound);
        }
        Ok(Deleted {
            id: quote_id.to_string(),
        })
    })();
    finish("delete_quote", result)
}
