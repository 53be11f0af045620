//! Quote and invoice list.

use super::{drain, send, wait_one, ConfirmGate};
use crate::backend::{spawn_backend, BackendHandle, CoreCmd, CoreEvent};
use crate::feedback::Feedback;
use crate::optimistic::{
    MutationId, MutationTicket, OptimisticCollection, PendingId, RecordKey, Removed, SyncError,
};
use agencydesk_core::models::quote::{
    CreateQuoteRequest, Quote, QuoteKind, QuotePatch, QuoteStatus,
};
use agencydesk_core::{Services, SessionProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct QuotesPage {
    backend: BackendHandle,
    quotes: OptimisticCollection<Quote>,
    feedback: Feedback,
    tickets: HashMap<MutationId, MutationTicket<Quote>>,
    removals: HashMap<String, Removed<Quote>>,
    delete_gate: ConfirmGate<String>,
}

impl QuotesPage {
    pub fn new(services: Services, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_backend(spawn_backend(services, session))
    }

    pub fn with_backend(backend: BackendHandle) -> Self {
        Self {
            backend,
            quotes: OptimisticCollection::new(),
            feedback: Feedback::new(),
            tickets: HashMap::new(),
            removals: HashMap::new(),
            delete_gate: ConfirmGate::default(),
        }
    }

    pub fn refresh(&mut self) {
        send(&self.backend, CoreCmd::ListQuotes);
    }

    pub fn create(&mut self, request: CreateQuoteRequest) -> PendingId {
        let pending = self.quotes.apply_create(Quote::draft(&request));
        send(&self.backend, CoreCmd::CreateQuote { pending, request });
        pending
    }

    /// # Errors
    /// Returns [`SyncError`] when the document is still pending or unknown.
    pub fn set_status(
        &mut self,
        quote_id: &str,
        status: QuoteStatus,
    ) -> Result<MutationId, SyncError> {
        self.update(quote_id, QuotePatch::status(status))
    }

    /// # Errors
    /// Returns [`SyncError`] when the document is still pending or unknown.
    pub fn update(&mut self, quote_id: &str, patch: QuotePatch) -> Result<MutationId, SyncError> {
        let ticket = self
            .quotes
            .apply_mutate(&RecordKey::Confirmed(quote_id.to_string()), patch)?;
        let mutation = ticket.mutation;
        send(
            &self.backend,
            CoreCmd::UpdateQuote {
                mutation,
                id: quote_id.to_string(),
                patch: ticket.patch.clone(),
            },
        );
        self.tickets.insert(mutation, ticket);
        Ok(mutation)
    }

    /// Show an unnumbered invoice draft and ask the backend to issue it.
    ///
    /// # Errors
    /// Returns [`SyncError`] when the quote is still pending or unknown.
    pub fn convert_to_invoice(&mut self, quote_id: &str) -> Result<PendingId, SyncError> {
        let key = RecordKey::Confirmed(quote_id.to_string());
        let mut draft = self.quotes.get(&key).cloned().ok_or(SyncError::NotFound)?;
        draft.id = String::new();
        draft.kind = QuoteKind::Invoice;
        draft.number = String::new();
        draft.status = QuoteStatus::Draft;
        draft.source_quote_id = Some(quote_id.to_string());

        let pending = self.quotes.apply_create(draft);
        send(
            &self.backend,
            CoreCmd::ConvertToInvoice {
                pending,
                quote_id: quote_id.to_string(),
            },
        );
        Ok(pending)
    }

    pub fn request_delete(&mut self, quote_id: &str) {
        self.delete_gate.request(quote_id.to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.delete_gate.cancel();
    }

    /// Run the staged delete.
    ///
    /// # Errors
    /// Returns [`SyncError::NotFound`] when nothing was staged or the document
    /// is gone, and [`SyncError::StillPending`] for unconfirmed documents.
    pub fn confirm_delete(&mut self) -> Result<(), SyncError> {
        let id = self.delete_gate.take().ok_or(SyncError::NotFound)?;
        let removed = self.quotes.apply_delete(&RecordKey::Confirmed(id.clone()))?;
        send(&self.backend, CoreCmd::DeleteQuote { id: id.clone() });
        self.removals.insert(id, removed);
        Ok(())
    }

    pub fn poll(&mut self) -> usize {
        let mut events = Vec::new();
        drain(&self.backend, |event| events.push(event));
        let handled = events.len();
        for event in events {
            self.handle_event(event);
        }
        handled
    }

    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match wait_one(&self.backend, timeout) {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    pub fn handle_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::QuotesLoaded { result } => match result {
                Ok(items) => self.quotes.replace_confirmed(items),
                Err(err) => self.feedback.set_status(err.to_string()),
            },
            CoreEvent::QuoteCreated { pending, result }
            | CoreEvent::InvoiceCreated { pending, result } => match result {
                Ok(quote) => self.quotes.confirm_create(pending, quote),
                Err(err) => {
                    let reason = err.to_string();
                    self.quotes.reject_create(pending, &reason);
                    self.feedback.set_status(reason);
                }
            },
            CoreEvent::QuoteUpdated { mutation, result } => {
                let Some(ticket) = self.tickets.remove(&mutation) else {
                    return;
                };
                match result {
                    Ok(quote) => self.quotes.confirm_mutate_with(&ticket, quote),
                    Err(err) => {
                        self.quotes.reject_mutate(&ticket);
                        self.feedback.set_status(err.to_string());
                    }
                }
            }
            CoreEvent::QuoteDeleted { id, result } => {
                let Some(removed) = self.removals.remove(&id) else {
                    return;
                };
                match result {
                    Ok(_) => self.quotes.confirm_delete(&id),
                    Err(err) => {
                        self.quotes.reject_delete(&removed);
                        self.feedback.set_status(err.to_string());
                    }
                }
            }
            other => tracing::debug!("quotes page ignored event: {:?}", other),
        }
    }

    pub fn quotes(&self) -> &OptimisticCollection<Quote> {
        &self.quotes
    }

    pub fn get(&self, quote_id: &str) -> Option<&Quote> {
        self.quotes.get(&RecordKey::Confirmed(quote_id.to_string()))
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }
}
