//! Order request assembly.

use rusty_money::{Money, iso::Currency};

use crate::{
    backend::{
        Address, CouponLine, LineItemRequest, MetaData, OrderRequest, OrderStatus, ShippingLine,
    },
    cart::CartStore,
    checkout::{CheckoutConfig, PaymentMethod, form::ShippingForm},
    money::plain_amount,
    pricing::PricingSnapshot,
};

/// Build the order creation payload for a validated, trimmed form.
pub(crate) fn build_order_request(
    form: &ShippingForm,
    cart: &CartStore<'_>,
    snapshot: &PricingSnapshot<'_>,
    method: PaymentMethod,
    config: &CheckoutConfig,
) -> OrderRequest {
    let full_address = form.full_address();
    let coupon = applied_coupon(snapshot);

    let (payment_method, payment_method_title, status) = match method {
        PaymentMethod::CashOnDelivery => (
            config.cod_method_code.clone(),
            config.cod_method_title.clone(),
            OrderStatus::Processing,
        ),
        PaymentMethod::Online => (
            config.gateway.method_code.clone(),
            config.gateway.method_title.clone(),
            OrderStatus::Pending,
        ),
    };

    let billing = Address {
        email: Some(form.email.clone()),
        phone: Some(form.phone.clone()),
        ..address(form, &config.country)
    };

    let line_items = cart
        .items()
        .iter()
        .map(|item| LineItemRequest {
            product_id: item.id(),
            quantity: item.quantity(),
        })
        .collect();

    let shipping_lines = if snapshot.delivery_charge.to_minor_units() > 0 {
        vec![ShippingLine {
            method_id: config.delivery_method_id.clone(),
            method_title: config.delivery_method_title.clone(),
            total: plain_amount(&snapshot.delivery_charge),
        }]
    } else {
        Vec::new()
    };

    let coupon_lines = coupon
        .iter()
        .map(|(code, discount)| CouponLine {
            code: code.to_lowercase(),
            discount: plain_amount(discount),
        })
        .collect();

    let free_gifts = config
        .free_gift
        .as_deref()
        .map(|gift| (cart.unit_count(), gift));

    let mut meta_data = vec![
        MetaData::new("whatsapp_number", &form.whatsapp),
        MetaData::new("full_address", &full_address),
        MetaData::new("subtotal", plain_amount(&snapshot.subtotal)),
        MetaData::new("delivery_charges", plain_amount(&snapshot.delivery_charge)),
        MetaData::new("final_total", plain_amount(&snapshot.final_total)),
    ];

    if let Some((count, gift)) = free_gifts {
        meta_data.push(MetaData::new("free_gifts", format!("{count} x {gift}")));
    }

    meta_data.push(MetaData::new("payment_method", &payment_method));

    if let Some((code, discount)) = coupon {
        meta_data.push(MetaData::new("coupon_code", code));
        meta_data.push(MetaData::new("coupon_discount", plain_amount(&discount)));
    }

    OrderRequest {
        payment_method,
        payment_method_title,
        status,
        billing,
        shipping: address(form, &config.country),
        line_items,
        shipping_lines,
        coupon_lines,
        customer_note: customer_note(form, &full_address, free_gifts, coupon),
        meta_data,
    }
}

fn address(form: &ShippingForm, country: &str) -> Address {
    Address {
        first_name: form.name.clone(),
        last_name: String::new(),
        address_1: form.address.clone(),
        address_2: String::new(),
        city: form.city.clone(),
        state: form.state.clone(),
        postcode: form.pincode.clone(),
        country: country.to_string(),
        email: None,
        phone: None,
    }
}

fn applied_coupon<'s, 'a>(
    snapshot: &'s PricingSnapshot<'a>,
) -> Option<(&'s str, Money<'a, Currency>)> {
    snapshot
        .qualifying_coupon()
        .map(|code| (code, snapshot.coupon_discount))
}

fn customer_note(
    form: &ShippingForm,
    full_address: &str,
    free_gifts: Option<(u32, &str)>,
    coupon: Option<(&str, Money<'_, Currency>)>,
) -> String {
    let mut lines = Vec::new();

    if !form.notes.is_empty() {
        lines.push(form.notes.clone());
        lines.push(String::new());
    }

    lines.push(format!("WhatsApp: {}", form.whatsapp));
    lines.push(format!("Full Address: {full_address}"));

    if let Some((count, gift)) = free_gifts {
        let plural = if count == 1 { "" } else { "s" };
        lines.push(format!("FREE GIFT: {count} x {gift}{plural}"));
    }

    if let Some((code, discount)) = coupon {
        lines.push(format!(
            "Coupon Applied: {code} ({} {} discount)",
            discount.currency().iso_alpha_code,
            plain_amount(&discount)
        ));
    }

    lines.join("\n")
}
