//! Invoice generation.
//!
//! Invoices are rendered on demand from the order's stored snapshots, so
//! they always reflect what was actually charged. The rendered bytes are
//! also written to the invoice directory for later retrieval; that write is
//! best effort and never blocks serving the document.

use std::path::PathBuf;
use std::sync::Arc;

use tamarind_core::{OrderId, UserId};

use crate::error::{Result, ShopError};
use crate::models::order::Order;
use crate::pdf::PdfBuilder;
use crate::stores::OrderStore;

/// A rendered invoice document.
#[derive(Debug, Clone)]
pub struct Invoice {
    /// Suggested download file name, `invoice-{order_id}.pdf`.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Renders and serves order invoices.
pub struct InvoiceService {
    orders: Arc<dyn OrderStore>,
    invoice_dir: PathBuf,
}

impl InvoiceService {
    /// Create an invoice service writing copies under `invoice_dir`.
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>, invoice_dir: impl Into<PathBuf>) -> Self {
        Self {
            orders,
            invoice_dir: invoice_dir.into(),
        }
    }

    /// Render the invoice for an order.
    ///
    /// Only the user who placed the order may fetch its invoice.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NotFound` if the order does not exist and
    /// `ShopError::Forbidden` if it belongs to another user.
    pub async fn render_invoice(
        &self,
        order_id: OrderId,
        requesting_user: UserId,
    ) -> Result<Invoice> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| ShopError::NotFound(format!("order {order_id}")))?;

        if order.user.user_id != requesting_user {
            return Err(ShopError::Forbidden(format!(
                "order {order_id} does not belong to user {requesting_user}"
            )));
        }

        let bytes = render(&order);
        let file_name = format!("invoice-{order_id}.pdf");

        self.persist_copy(&file_name, &bytes).await;

        Ok(Invoice { file_name, bytes })
    }

    async fn persist_copy(&self, file_name: &str, bytes: &[u8]) {
        let write = async {
            tokio::fs::create_dir_all(&self.invoice_dir).await?;
            tokio::fs::write(self.invoice_dir.join(file_name), bytes).await
        };
        if let Err(err) = write.await {
            tracing::warn!(file_name, error = %err, "failed to store invoice copy");
        }
    }
}

/// Lay out the invoice document.
fn render(order: &Order) -> Vec<u8> {
    let mut pdf = PdfBuilder::new();
    pdf.line(24, "Invoice");
    pdf.line(12, &format!("Order #{}", order.id));
    pdf.blank_line();

    for item in &order.line_items {
        pdf.line(
            12,
            &format!(
                "{}: {} x {} = {:.2}",
                item.product.title,
                item.product.price,
                item.quantity,
                item.line_total()
            ),
        );
    }

    pdf.blank_line();
    pdf.line(12, "----------------------");
    pdf.line(14, &format!("Total: {:.2}", order.total()));
    pdf.finish()
}
