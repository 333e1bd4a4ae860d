//! The download email sent after a confirmed payment.

use storefront_common::{escape_html, EmailMessage};
use storefront_config::DeliveryConfig;

use crate::logic::{CompletedPurchase, DownloadLink};

const BUTTON_STYLE: &str = "background-color: #000; color: #fff; padding: 15px 25px; \
text-decoration: none; border-radius: 5px; font-weight: bold; display: inline-block; margin-top: 10px;";

/// `15000, "mxn"` renders as `$150.00 MXN`.
pub fn format_amount(amount: i64, currency: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let minor = amount.unsigned_abs();
    format!(
        "{sign}${}.{:02} {}",
        minor / 100,
        minor % 100,
        currency.to_uppercase()
    )
}

fn subject(delivery: &DeliveryConfig) -> String {
    match delivery.store_name.as_deref().filter(|s| !s.is_empty()) {
        Some(store) => format!("{} - {}", delivery.subject, store),
        None => delivery.subject.clone(),
    }
}

fn support_line(delivery: &DeliveryConfig) -> String {
    match &delivery.support_email {
        Some(support) => format!("responde a este correo o escribe a {}", escape_html(support)),
        None => "responde a este correo".to_string(),
    }
}

pub fn compose_delivery_email(
    delivery: &DeliveryConfig,
    sender: &str,
    purchase: &CompletedPurchase,
    links: &[DownloadLink],
    placeholder: bool,
) -> EmailMessage {
    let amount = purchase
        .amount_total
        .map(|a| format_amount(a, purchase.currency.as_deref().unwrap_or("mxn")));

    let mut html = String::from(r#"<div style="font-family: Arial, sans-serif; padding: 20px;">"#);
    html.push_str(r#"<h1 style="color: #4CAF50;">¡Gracias por tu compra!</h1>"#);
    if let Some(name) = &purchase.customer_name {
        html.push_str(&format!("<p>Hola {},</p>", escape_html(name)));
    }
    if let Some(amount) = &amount {
        html.push_str(&format!(
            "<p>Hemos confirmado tu pago de <strong>{}</strong>.</p>",
            escape_html(amount)
        ));
    }

    let mut text = String::from("¡Gracias por tu compra!\n\n");
    if let Some(amount) = &amount {
        text.push_str(&format!("Hemos confirmado tu pago de {amount}.\n\n"));
    }

    if placeholder {
        html.push_str(&format!(
            "<p>No pudimos identificar automáticamente los archivos de tu compra. \
Por favor {} indicando tu número de pedido <strong>{}</strong> y te los enviaremos.</p>",
            support_line(delivery),
            escape_html(&purchase.session_id)
        ));
        text.push_str(&format!(
            "No pudimos identificar automáticamente los archivos de tu compra. \
Por favor responde a este correo indicando tu número de pedido {}.\n",
            purchase.session_id
        ));
    } else {
        html.push_str("<p>Aquí tienes los recursos digitales que adquiriste:</p>");
        for link in links {
            html.push_str(&format!(
                r#"<p><a href="{}" style="{}">DESCARGAR {}</a></p>"#,
                escape_html(&link.url),
                BUTTON_STYLE,
                escape_html(&link.file_id)
            ));
            text.push_str(&format!("{}: {}\n", link.file_id, link.url));
        }
        html.push_str(&format!(
            r#"<p style="margin-top: 30px; font-size: 12px; color: #666;">Si tienes problemas con la descarga, {}.</p>"#,
            support_line(delivery)
        ));
    }
    html.push_str("</div>");

    EmailMessage {
        from: sender.to_string(),
        to: vec![purchase.customer_email.clone()],
        subject: subject(delivery),
        html,
        text: Some(text),
        reply_to: delivery.support_email.clone(),
    }
}
