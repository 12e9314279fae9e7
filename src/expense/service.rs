use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::pod::{PodError, RdfSource, ResourceClient, iri};
use crate::rdf::syntax::Syntax;

use super::{Expense, ExpensePayload, WebIdProfile};

/// Create, read, update and delete expenses on a pod.
pub(crate) struct ExpenseService<C> {
    client: C,
}

impl<C: ResourceClient> ExpenseService<C> {
    pub(crate) fn new(client: C) -> Self {
        ExpenseService { client }
    }

    pub(crate) fn pods(&self, webid: &str) -> Result<BTreeSet<String>, PodError> {
        let webid = iri::normalize(webid)?;
        let profile: WebIdProfile = self.client.read(&webid).inspect_err(|error| {
            warn!(target: "crud", %webid, %error, "reading webid profile failed");
        })?;
        profile.storages()
    }

    pub(crate) fn create(&self, expense: Expense) -> Result<Expense, PodError> {
        let identifier = expense.identifier().to_string();
        let created = self.client.create(expense).inspect_err(|error| {
            warn!(target: "crud", %identifier, %error, "create expense failed");
        })?;
        let etag = created.metadata().etag.as_deref().unwrap_or_default();
        info!(target: "crud", %identifier, etag, "created expense");
        log_turtle(&created);
        Ok(created)
    }

    pub(crate) fn read(&self, identifier: &str) -> Result<Expense, PodError> {
        let identifier = iri::normalize(identifier)?;
        let expense: Expense = self.client.read(&identifier).inspect_err(|error| {
            warn!(target: "crud", %identifier, %error, "read expense failed");
        })?;
        debug!(
            target: "crud",
            %identifier,
            triples = expense.graph().len(),
            unmodeled = expense.unmodeled_len(),
            content_type = expense.metadata().content_type.as_deref().unwrap_or_default(),
            "read expense"
        );
        Ok(expense)
    }

    pub(crate) fn update(&self, expense: Expense) -> Result<Expense, PodError> {
        let identifier = expense.identifier().to_string();
        let updated = self.client.update(expense).inspect_err(|error| {
            warn!(target: "crud", %identifier, %error, "update expense failed");
        })?;
        let etag = updated.metadata().etag.as_deref().unwrap_or_default();
        info!(target: "crud", %identifier, etag, "updated expense");
        log_turtle(&updated);
        Ok(updated)
    }

    /// Overwrites the modeled attributes of a stored expense with `payload`.
    ///
    /// The stored document is read first, so triples the payload cannot
    /// express survive the write.
    pub(crate) fn update_from_payload(&self, payload: ExpensePayload) -> Result<Expense, PodError> {
        let mut expense = self.read(&payload.identifier)?;
        expense.apply_payload(payload)?;
        self.update(expense)
    }

    pub(crate) fn delete(&self, identifier: &str) -> Result<(), PodError> {
        let identifier = iri::normalize(identifier)?;
        self.client.delete(&identifier).inspect_err(|error| {
            warn!(target: "crud", %identifier, %error, "delete expense failed");
        })?;
        info!(target: "crud", %identifier, "deleted expense");
        Ok(())
    }

    /// Stores a non-RDF file, e.g. the image of a receipt.
    pub(crate) fn store_file(
        &self,
        destination: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<String, PodError> {
        let destination = iri::normalize(destination)?;
        let stored = self
            .client
            .create_binary(&destination, content_type, body)
            .inspect_err(|error| {
                warn!(target: "crud", %destination, %error, "storing file failed");
            })?;
        info!(target: "crud", identifier = %stored, content_type, "stored file");
        Ok(stored)
    }

    /// Uploads a receipt, then links it into the expense.
    ///
    /// The steps are not atomic: if reading or updating the expense fails, the
    /// uploaded file stays where it is and linking it can be retried on its own.
    pub(crate) fn attach_receipt(
        &self,
        body: Vec<u8>,
        content_type: &str,
        expense_identifier: &str,
        receipt_identifier: &str,
    ) -> Result<Expense, PodError> {
        let receipt = self.store_file(receipt_identifier, content_type, body)?;
        let mut expense = self.read(expense_identifier)?;
        expense.add_receipt(&receipt)?;
        self.update(expense).inspect_err(|_| {
            warn!(target: "crud", %receipt, "receipt uploaded but not linked");
        })
    }

    /// Unlinks a receipt from the expense; the file itself is left alone.
    pub(crate) fn detach_receipt(
        &self,
        expense_identifier: &str,
        receipt_identifier: &str,
    ) -> Result<Expense, PodError> {
        let receipt = iri::normalize(receipt_identifier)?;
        let mut expense = self.read(expense_identifier)?;
        if !expense.remove_receipt(&receipt) {
            debug!(target: "crud", %receipt, "receipt was not linked");
            return Ok(expense);
        }
        self.update(expense)
    }
}

fn log_turtle(expense: &Expense) {
    match expense.serialize(Syntax::Turtle) {
        Ok(bytes) => {
            debug!(target: "crud", turtle = %String::from_utf8_lossy(&bytes), "persisted expense");
        }
        Err(error) => {
            warn!(target: "crud", %error, "unable to render expense as turtle");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use anyhow::Result;
    use rust_decimal::Decimal;

    use super::ExpenseService;
    use crate::expense::{Expense, ExpensePayload};
    use crate::pod::{MemoryPod, PodError, RdfSource};
    use crate::rdf::vocab::PIM_STORAGE;
    use crate::rdf::{Graph, Term, Triple};

    const ID: &str = "https://pod.example/expenses/1";
    const RECEIPT: &str = "https://pod.example/receipts/r1.png";

    fn expense() -> Result<Expense> {
        let mut expense = Expense::new(ID)?;
        expense.set_description(Some("Train ticket".into()));
        expense.set_amount(Some(Decimal::from_str("49.90")?));
        Ok(expense)
    }

    #[test]
    fn create_then_read() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        let created = service.create(expense()?)?;
        assert!(created.metadata().etag.is_some());

        let read = service.read(ID)?;
        assert_eq!(read.description()?.as_deref(), Some("Train ticket"));
        assert_eq!(read.amount()?.map(|a| a.to_string()).as_deref(), Some("49.90"));
        Ok(())
    }

    #[test]
    fn create_twice_is_already_exists() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        service.create(expense()?)?;
        let err = service.create(expense()?).unwrap_err();
        assert!(matches!(err, PodError::AlreadyExists { identifier } if identifier == ID));
        Ok(())
    }

    #[test]
    fn missing_expense_is_not_found() {
        let service = ExpenseService::new(MemoryPod::default());
        assert!(matches!(
            service.read(ID).unwrap_err(),
            PodError::NotFound { .. }
        ));
        assert!(matches!(
            service.delete(ID).unwrap_err(),
            PodError::NotFound { .. }
        ));
        assert!(matches!(
            service.update(expense().unwrap()).unwrap_err(),
            PodError::NotFound { .. }
        ));
    }

    #[test]
    fn denied_resources_are_access_denied() -> Result<()> {
        let pod = MemoryPod::default();
        pod.deny(ID);
        let service = ExpenseService::new(pod);
        assert!(matches!(
            service.create(expense()?).unwrap_err(),
            PodError::AccessDenied { status: 403, .. }
        ));
        assert!(matches!(
            service.read(ID).unwrap_err(),
            PodError::AccessDenied { .. }
        ));
        Ok(())
    }

    #[test]
    fn denied_after_create_blocks_update_and_delete() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        service.create(expense()?)?;
        service.client.deny(ID);
        assert!(matches!(
            service.update(expense()?).unwrap_err(),
            PodError::AccessDenied { status: 403, .. }
        ));
        assert!(matches!(
            service.delete(ID).unwrap_err(),
            PodError::AccessDenied { status: 403, .. }
        ));
        assert!(matches!(
            service.update_from_payload(expense()?.to_payload()?).unwrap_err(),
            PodError::AccessDenied { .. }
        ));
        Ok(())
    }

    #[test]
    fn payload_update_keeps_unmodeled_triples() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        service.create(expense()?)?;
        let extra = Triple::new(
            Term::named(ID),
            "https://example.org/ns#approvedBy",
            Term::named("https://pod.example/people/finance#me"),
        );
        service.client.put_triple(ID, extra.clone());

        let payload = ExpensePayload {
            identifier: ID.into(),
            description: Some("Night train".into()),
            ..Default::default()
        };
        let updated = service.update_from_payload(payload)?;
        assert_eq!(updated.description()?.as_deref(), Some("Night train"));

        let read = service.read(ID)?;
        assert!(read.graph().contains(&extra));
        assert_eq!(read.description()?.as_deref(), Some("Night train"));
        assert_eq!(read.amount()?, None);
        Ok(())
    }

    #[test]
    fn payload_update_of_missing_expense_is_not_found() {
        let service = ExpenseService::new(MemoryPod::default());
        let payload = ExpensePayload {
            identifier: ID.into(),
            ..Default::default()
        };
        assert!(matches!(
            service.update_from_payload(payload).unwrap_err(),
            PodError::NotFound { .. }
        ));
    }

    #[test]
    fn update_keeps_unmodeled_triples() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        let mut local = expense()?;
        let extra = Triple::new(
            Term::named(ID),
            "https://example.org/ns#approvedBy",
            Term::named("https://pod.example/people/finance#me"),
        );
        local.add_receipt("https://pod.example/receipts/r0.png")?;
        service.create(local)?;
        service.client.put_triple(ID, extra.clone());

        let mut read = service.read(ID)?;
        read.set_category(Some("Travel".into()));
        service.update(read)?;

        let read = service.read(ID)?;
        assert!(read.graph().contains(&extra));
        assert_eq!(read.category()?.as_deref(), Some("Travel"));
        Ok(())
    }

    #[test]
    fn delete_removes_expense() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        service.create(expense()?)?;
        service.delete(ID)?;
        assert!(matches!(
            service.read(ID).unwrap_err(),
            PodError::NotFound { .. }
        ));
        Ok(())
    }

    #[test]
    fn attach_receipt_links_upload() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        service.create(expense()?)?;
        let updated = service.attach_receipt(b"png".to_vec(), "image/png", ID, RECEIPT)?;
        assert_eq!(updated.receipts()?, BTreeSet::from([RECEIPT.to_string()]));
        assert_eq!(service.read(ID)?.receipts()?, BTreeSet::from([RECEIPT.to_string()]));
        assert_eq!(service.client.binary(RECEIPT).as_deref(), Some(&b"png"[..]));
        Ok(())
    }

    #[test]
    fn attach_receipt_stops_when_upload_fails() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        service.create(expense()?)?;
        service.attach_receipt(b"one".to_vec(), "image/png", ID, RECEIPT)?;
        let reads_before = service.client.reads();

        let err = service
            .attach_receipt(b"two".to_vec(), "image/png", ID, RECEIPT)
            .unwrap_err();
        assert!(matches!(err, PodError::AlreadyExists { .. }));
        assert_eq!(service.client.reads(), reads_before);
        Ok(())
    }

    #[test]
    fn attach_receipt_reports_failed_update() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        service.create(expense()?)?;
        service.client.fail_updates(503);

        let err = service
            .attach_receipt(b"png".to_vec(), "image/png", ID, RECEIPT)
            .unwrap_err();
        assert!(matches!(err, PodError::Transport { status: Some(503), .. }));
        // the upload stays reachable, the expense is unchanged
        assert_eq!(service.client.binary(RECEIPT).as_deref(), Some(&b"png"[..]));
        assert!(service.read(ID)?.receipts()?.is_empty());
        Ok(())
    }

    #[test]
    fn attach_receipt_to_missing_expense() {
        let service = ExpenseService::new(MemoryPod::default());
        let err = service
            .attach_receipt(b"png".to_vec(), "image/png", ID, RECEIPT)
            .unwrap_err();
        assert!(matches!(err, PodError::NotFound { .. }));
        assert!(service.client.binary(RECEIPT).is_some());
    }

    #[test]
    fn detach_receipt_unlinks_only() -> Result<()> {
        let service = ExpenseService::new(MemoryPod::default());
        service.create(expense()?)?;
        service.attach_receipt(b"png".to_vec(), "image/png", ID, RECEIPT)?;

        let updated = service.detach_receipt(ID, RECEIPT)?;
        assert!(updated.receipts()?.is_empty());
        assert!(service.read(ID)?.receipts()?.is_empty());
        assert!(service.client.binary(RECEIPT).is_some());

        // unlinking again leaves the expense as it is
        let unchanged = service.detach_receipt(ID, RECEIPT)?;
        assert!(unchanged.receipts()?.is_empty());
        Ok(())
    }

    #[test]
    fn pods_lists_storages() -> Result<()> {
        let webid = "https://id.example/alice/profile/card#me";
        let graph: Graph = [
            Triple::new(
                Term::named(webid),
                PIM_STORAGE,
                Term::named("https://pod.example/alice/"),
            ),
            Triple::new(
                Term::named(webid),
                PIM_STORAGE,
                Term::named("https://backup.example/alice/"),
            ),
        ]
        .into_iter()
        .collect();
        let pod = MemoryPod::default();
        pod.put_graph(webid, &graph)?;
        let service = ExpenseService::new(pod);
        assert_eq!(
            service.pods(webid)?,
            BTreeSet::from([
                "https://backup.example/alice/".to_string(),
                "https://pod.example/alice/".to_string(),
            ])
        );
        Ok(())
    }
}
