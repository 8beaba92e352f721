//! SMTP-backed notifier.
//!
//! Sends the transactional emails of the shop (order confirmation, admin
//! alert, status updates) over async SMTP with HTML + plain text bodies.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::{ExposeSecret, SecretString};

use crate::model::Order;
use crate::notify::{Notifier, NotifyError};
use crate::types::{Email, OrderStatus};

/// SMTP transport settings.
///
/// Loaded once from the environment by the binaries and injected here.
#[derive(Clone)]
pub struct SmtpSettings {
    /// SMTP relay host.
    pub host: String,
    /// SMTP relay port (STARTTLS).
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: SecretString,
    /// From address for all shop email.
    pub from_address: String,
    /// Inbox that receives new-order alerts.
    pub admin_address: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("admin_address", &self.admin_address)
            .finish()
    }
}

/// One rendered line item row in an email body.
struct ItemRow {
    name: String,
    qty: u32,
    amount: String,
}

fn item_rows(order: &Order) -> Vec<ItemRow> {
    order
        .items
        .iter()
        .map(|item| ItemRow {
            name: match &item.flavor {
                Some(flavor) => format!("{} ({})", item.name, flavor.name),
                None => item.name.clone(),
            },
            qty: item.qty,
            amount: item.line_total().to_string(),
        })
        .collect()
}

fn pickup_date_fr(order: &Order) -> String {
    order
        .pickup_or_delivery_date
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    client_name: &'a str,
    order_number: &'a str,
    items: Vec<ItemRow>,
    total: String,
    payment_method: &'a str,
    pickup_date: String,
    notes: String,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    client_name: &'a str,
    order_number: &'a str,
    items: Vec<ItemRow>,
    total: String,
    payment_method: &'a str,
    pickup_date: String,
    notes: String,
}

#[derive(Template)]
#[template(path = "email/admin_new_order.html")]
struct AdminNewOrderHtml<'a> {
    order_number: &'a str,
    client_name: &'a str,
    client_phone: &'a str,
    client_email: String,
    items: Vec<ItemRow>,
    total: String,
    payment_method: &'a str,
    pickup_date: String,
}

#[derive(Template)]
#[template(path = "email/admin_new_order.txt")]
struct AdminNewOrderText<'a> {
    order_number: &'a str,
    client_name: &'a str,
    client_phone: &'a str,
    client_email: String,
    items: Vec<ItemRow>,
    total: String,
    payment_method: &'a str,
    pickup_date: String,
}

#[derive(Template)]
#[template(path = "email/status_update.html")]
struct StatusUpdateHtml<'a> {
    client_name: &'a str,
    order_number: &'a str,
    status_label: &'a str,
    pickup_date: String,
}

#[derive(Template)]
#[template(path = "email/status_update.txt")]
struct StatusUpdateText<'a> {
    client_name: &'a str,
    order_number: &'a str,
    status_label: &'a str,
    pickup_date: String,
}

/// Notifier delivering over SMTP.
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    admin_address: String,
}

impl SmtpNotifier {
    /// Build the transport from settings.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] when the relay configuration is
    /// invalid.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(
            settings.username.clone(),
            settings.password.expose_secret().to_owned(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: settings.from_address.clone(),
            admin_address: settings.admin_address.clone(),
        })
    }

    async fn send_multipart(
        &self,
        to: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidRecipient(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| NotifyError::InvalidRecipient(to.to_owned()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tracing::info!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn order_created(&self, order: &Order) -> Result<(), NotifyError> {
        let Some(email) = &order.client_email else {
            return Ok(());
        };

        let subject = format!("Confirmation de votre commande {}", order.order_number);
        let html = OrderConfirmationHtml {
            client_name: &order.client_name,
            order_number: &order.order_number,
            items: item_rows(order),
            total: order.total_price.to_string(),
            payment_method: order.payment_method.as_str(),
            pickup_date: pickup_date_fr(order),
            notes: order.notes.clone().unwrap_or_default(),
        }
        .render()
        .map_err(|e| NotifyError::Template(e.to_string()))?;
        let text = OrderConfirmationText {
            client_name: &order.client_name,
            order_number: &order.order_number,
            items: item_rows(order),
            total: order.total_price.to_string(),
            payment_method: order.payment_method.as_str(),
            pickup_date: pickup_date_fr(order),
            notes: order.notes.clone().unwrap_or_default(),
        }
        .render()
        .map_err(|e| NotifyError::Template(e.to_string()))?;

        self.send_multipart(email.as_str(), &subject, text, html).await
    }

    async fn admin_new_order(&self, order: &Order) -> Result<(), NotifyError> {
        let subject = format!("Nouvelle commande {}", order.order_number);
        let html = AdminNewOrderHtml {
            order_number: &order.order_number,
            client_name: &order.client_name,
            client_phone: &order.client_phone,
            client_email: order.client_email.as_ref().map(Email::as_str).unwrap_or_default().to_owned(),
            items: item_rows(order),
            total: order.total_price.to_string(),
            payment_method: order.payment_method.as_str(),
            pickup_date: pickup_date_fr(order),
        }
        .render()
        .map_err(|e| NotifyError::Template(e.to_string()))?;
        let text = AdminNewOrderText {
            order_number: &order.order_number,
            client_name: &order.client_name,
            client_phone: &order.client_phone,
            client_email: order.client_email.as_ref().map(Email::as_str).unwrap_or_default().to_owned(),
            items: item_rows(order),
            total: order.total_price.to_string(),
            payment_method: order.payment_method.as_str(),
            pickup_date: pickup_date_fr(order),
        }
        .render()
        .map_err(|e| NotifyError::Template(e.to_string()))?;

        self.send_multipart(&self.admin_address, &subject, text, html)
            .await
    }

    async fn status_changed(
        &self,
        order: &Order,
        new_status: OrderStatus,
    ) -> Result<(), NotifyError> {
        let Some(email) = &order.client_email else {
            return Ok(());
        };

        let subject = format!("Mise à jour de votre commande {}", order.order_number);
        let html = StatusUpdateHtml {
            client_name: &order.client_name,
            order_number: &order.order_number,
            status_label: new_status.label_fr(),
            pickup_date: pickup_date_fr(order),
        }
        .render()
        .map_err(|e| NotifyError::Template(e.to_string()))?;
        let text = StatusUpdateText {
            client_name: &order.client_name,
            order_number: &order.order_number,
            status_label: new_status.label_fr(),
            pickup_date: pickup_date_fr(order),
        }
        .render()
        .map_err(|e| NotifyError::Template(e.to_string()))?;

        self.send_multipart(email.as_str(), &subject, text, html).await
    }
}
