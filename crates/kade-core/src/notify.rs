//! # Customer Notifications
//!
//! Builds the sale summary sent to a customer after checkout and the
//! WhatsApp deep link that carries it. Opening the link is the app's job.
//!
//! ## Link Format
//! ```text
//!   contact "071 111-1111", country code "94"
//!        │
//!        ▼ keep digits, swap a leading 0 for the country code
//!   "94711111111"
//!        │
//!        ▼
//!   https://wa.me/94711111111?text=<percent-encoded message>
//! ```

use crate::types::{PaymentStatus, Sale, ShopProfile};

/// Default dialling code for local numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "94";

/// Plain-text summary of a sale.
pub fn compose_sale_message(profile: &ShopProfile, sale: &Sale) -> String {
    let mut lines = Vec::with_capacity(sale.items.len() + 8);

    lines.push(format!("*{}*", profile.name));
    lines.push(format!("Invoice #{}", sale.invoice_number()));
    lines.push(format!("Date: {}", sale.date.format("%Y-%m-%d %H:%M")));
    lines.push(String::new());

    for item in &sale.items {
        lines.push(format!(
            "{} x{} = {}",
            item.name,
            item.quantity,
            item.line_total()
        ));
    }

    lines.push(String::new());
    lines.push(format!("Subtotal: {}", sale.subtotal()));
    if sale.discount_cents != 0 {
        lines.push(format!("Discount: {}", sale.discount()));
    }
    if sale.tax_cents != 0 {
        lines.push(format!("Tax: {}", sale.tax()));
    }
    lines.push(format!("Total: {}", sale.total()));

    match sale.payment_status {
        PaymentStatus::Paid => lines.push(format!("Paid by {}", sale.payment_method)),
        PaymentStatus::Pending => lines.push(format!("Balance due: {}", sale.total())),
    }

    if !profile.footer_note.trim().is_empty() {
        lines.push(String::new());
        lines.push(profile.footer_note.trim().to_string());
    }

    lines.join("\n")
}

/// Normalizes a contact into international digits.
///
/// Returns `None` when the contact holds no digits.
pub fn international_number(contact: &str, country_code: &str) -> Option<String> {
    let digits: String = contact.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    match digits.strip_prefix('0') {
        Some(local) => Some(format!("{}{}", country_code, local)),
        None => Some(digits),
    }
}

/// WhatsApp deep link for `contact` with `message` pre-filled.
///
/// ```rust
/// # use kade_core::notify::whatsapp_link;
/// let link = whatsapp_link("0711111111", "Total: Rs. 500.00", "94").unwrap();
/// assert_eq!(link, "https://wa.me/94711111111?text=Total%3A%20Rs.%20500.00");
/// ```
pub fn whatsapp_link(contact: &str, message: &str, country_code: &str) -> Option<String> {
    let number = international_number(contact, country_code)?;
    Some(format!(
        "https://wa.me/{}?text={}",
        number,
        urlencoding::encode(message)
    ))
}
