// src/services/invoice_service.rs

use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, OrderRepository, SettingsRepository, UserRepository},
    models::{
        auth::{Role, User},
        billing::{BillTo, BusinessIdentity, Invoice, InvoiceLine},
        orders::{Order, OrderAddOn},
        settings::BusinessSettings,
    },
    services::pricing,
};

// IVA fixo de 18%, aplicado uniformemente em toda fatura.
// Regra de negócio herdada do app; deliberadamente NÃO configurável.
fn vat_rate() -> Decimal {
    Decimal::new(18, 2)
}

// ---
// Montagem (pura): nenhum efeito colateral além da estrutura retornada.
// ---
pub fn assemble_invoice(
    order: &Order,
    add_ons: &[OrderAddOn],
    customer: &User,
    service_name: &str,
    settings: &BusinessSettings,
    lang: &str,
) -> Invoice {
    let weight = order.actual_weight_kg.or(order.estimated_weight_kg);

    let mut lines = Vec::with_capacity(1 + add_ons.len());

    // Uma linha para o serviço principal...
    let service_total = pricing::service_cost(order.service_price_per_kg, weight);
    let service_description = match weight {
        Some(kg) => format!("{} ({} kg)", service_name, kg),
        None => {
            if lang == "pt" {
                format!("{} (peso a confirmar)", service_name)
            } else {
                format!("{} (weight to be confirmed)", service_name)
            }
        }
    };
    lines.push(InvoiceLine {
        description: service_description,
        quantity: weight.unwrap_or(Decimal::ZERO),
        unit_rate: order.service_price_per_kg,
        total: service_total,
    });

    // ...e uma por adicional, com os valores congelados na criação.
    for add_on in add_ons {
        lines.push(InvoiceLine {
            description: add_on.name.clone(),
            quantity: Decimal::from(add_on.quantity),
            unit_rate: add_on.unit_price,
            total: add_on.line_total,
        });
    }

    let subtotal: Decimal = lines.iter().map(|l| l.total).sum();
    let vat_amount = (subtotal * vat_rate()).round_dp(2);

    // Linha de frete só aparece quando há distância cobrada.
    let delivery_fee = (order.billed_km > 0).then_some(order.delivery_fee);

    let grand_total = subtotal + vat_amount + delivery_fee.unwrap_or(Decimal::ZERO);

    Invoice {
        business: BusinessIdentity {
            name: settings.business_name.clone(),
            document_number: settings.document_number.clone(),
            address: settings.address.clone(),
            phone: settings.phone.clone(),
            email: settings.email.clone(),
        },
        bill_to: BillTo {
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            address: order.pickup_address.clone(),
        },
        order_display_id: order.display_id,
        issued_at: order.created_at,
        lines,
        subtotal,
        vat_rate: vat_rate(),
        vat_amount,
        delivery_fee,
        grand_total,
        currency: order.currency.clone(),
        payment_method: "cash_on_delivery",
        payment_status: order.payment_status,
        status_label: order.status.label(lang).to_string(),
        last_updated_at: order.updated_at,
        pix_key: settings.pix_key.clone(),
    }
}

#[derive(Clone)]
pub struct InvoiceService {
    order_repo: OrderRepository,
    user_repo: UserRepository,
    catalog_repo: CatalogRepository,
    settings_repo: SettingsRepository,
    pool: PgPool,
}

impl InvoiceService {
    pub fn new(
        order_repo: OrderRepository,
        user_repo: UserRepository,
        catalog_repo: CatalogRepository,
        settings_repo: SettingsRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            order_repo,
            user_repo,
            catalog_repo,
            settings_repo,
            pool,
        }
    }

    pub async fn get_invoice(
        &self,
        order_id: Uuid,
        viewer: &User,
        lang: &str,
    ) -> Result<Invoice, AppError> {
        let order = self
            .order_repo
            .find_by_id(&self.pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if viewer.role == Role::Customer && order.customer_id != viewer.id {
            return Err(AppError::OrderNotFound);
        }

        let add_ons = self.order_repo.list_add_ons(&self.pool, order_id).await?;
        let customer = self
            .user_repo
            .find_by_id(order.customer_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let service_name = self
            .catalog_repo
            .find_service(order.service_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();
        let settings = self.settings_repo.get().await?;

        Ok(assemble_invoice(
            &order,
            &add_ons,
            &customer,
            &service_name,
            &settings,
            lang,
        ))
    }

    pub async fn generate_pdf(
        &self,
        order_id: Uuid,
        viewer: &User,
        lang: &str,
    ) -> Result<Vec<u8>, AppError> {
        let invoice = self.get_invoice(order_id, viewer, lang).await?;
        render_pdf(&invoice, lang)
    }
}

// ---
// Renderização: consome a estrutura montada acima, nada além dela.
// ---
pub fn render_pdf(invoice: &Invoice, lang: &str) -> Result<Vec<u8>, AppError> {
    // Carrega a fonte da pasta 'fonts/'
    let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
        .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Fatura #{}", invoice.order_display_id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    let money = |amount: &Decimal| format!("{} {:.2}", invoice.currency, amount);
    let date_fmt = if lang == "pt" { "%d/%m/%Y" } else { "%Y-%m-%d" };

    // --- CABEÇALHO ---
    doc.push(
        elements::Paragraph::new(invoice.business.name.clone())
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    if let Some(doc_num) = &invoice.business.document_number {
        doc.push(
            elements::Paragraph::new(format!("CNPJ/CPF: {}", doc_num))
                .styled(style::Style::new().with_font_size(10)),
        );
    }
    if let Some(phone) = &invoice.business.phone {
        doc.push(
            elements::Paragraph::new(format!("Tel: {}", phone))
                .styled(style::Style::new().with_font_size(10)),
        );
    }

    doc.push(elements::Break::new(1.5));

    doc.push(
        elements::Paragraph::new(format!("FATURA / PEDIDO #{}", invoice.order_display_id))
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Paragraph::new(format!(
        "Data: {}",
        invoice.issued_at.format(date_fmt)
    )));
    doc.push(elements::Paragraph::new(format!(
        "Status: {} (atualizado em {})",
        invoice.status_label,
        invoice.last_updated_at.format(date_fmt)
    )));

    doc.push(elements::Break::new(1));

    // --- BLOCO DO CLIENTE ---
    doc.push(
        elements::Paragraph::new("Cliente").styled(style::Style::new().bold().with_font_size(11)),
    );
    doc.push(elements::Paragraph::new(invoice.bill_to.name.clone()));
    doc.push(elements::Paragraph::new(invoice.bill_to.email.clone()));
    if let Some(phone) = &invoice.bill_to.phone {
        doc.push(elements::Paragraph::new(phone.clone()));
    }
    doc.push(elements::Paragraph::new(invoice.bill_to.address.clone()));

    doc.push(elements::Break::new(2));

    // --- TABELA DE ITENS ---
    // Pesos das colunas: Descrição (4), Qtd (1), Unitário (2), Total (2)
    let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Descrição").styled(style_bold))
        .element(elements::Paragraph::new("Qtd").styled(style_bold))
        .element(elements::Paragraph::new("Unitário").styled(style_bold))
        .element(elements::Paragraph::new("Total").styled(style_bold))
        .push()
        .map_err(|e| AppError::PdfError(e.to_string()))?;

    for line in &invoice.lines {
        table
            .row()
            .element(elements::Paragraph::new(line.description.clone()))
            .element(elements::Paragraph::new(format!("{:.2}", line.quantity)))
            .element(elements::Paragraph::new(money(&line.unit_rate)))
            .element(elements::Paragraph::new(money(&line.total)))
            .push()
            .map_err(|e| AppError::PdfError(e.to_string()))?;
    }

    doc.push(table);
    doc.push(elements::Break::new(1.5));

    // --- TOTAIS ---
    let mut push_total = |label: String, value: String, bold: bool| {
        let mut paragraph = elements::Paragraph::new(format!("{}: {}", label, value));
        paragraph.set_alignment(Alignment::Right);
        if bold {
            doc.push(paragraph.styled(style::Style::new().bold().with_font_size(12)));
        } else {
            doc.push(paragraph);
        }
    };

    push_total("Subtotal".into(), money(&invoice.subtotal), false);
    push_total(
        format!("IVA ({}%)", invoice.vat_rate * Decimal::from(100)),
        money(&invoice.vat_amount),
        false,
    );
    if let Some(fee) = &invoice.delivery_fee {
        push_total("Frete (coleta/entrega)".into(), money(fee), false);
    }
    push_total("TOTAL GERAL".into(), money(&invoice.grand_total), true);

    doc.push(elements::Break::new(2));

    // --- PAGAMENTO ---
    doc.push(
        elements::Paragraph::new("Pagamento na entrega (dinheiro)")
            .styled(style::Style::new().with_font_size(10)),
    );

    if let Some(key) = &invoice.pix_key {
        doc.push(elements::Break::new(1));
        doc.push(
            elements::Paragraph::new("PAGAMENTO VIA PIX")
                .styled(style::Style::new().bold().with_font_size(12)),
        );
        doc.push(elements::Paragraph::new(format!("Chave: {}", key)));

        let code = QrCode::new(key.as_bytes()).map_err(|e| AppError::PdfError(e.to_string()))?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::PdfError(e.to_string()))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);
    }

    // --- RODAPÉ ---
    if let Some(addr) = &invoice.business.address {
        doc.push(elements::Break::new(2));
        doc.push(
            elements::Paragraph::new(addr.clone())
                .styled(style::Style::new().italic().with_font_size(8)),
        );
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::PdfError(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::orders::{OrderSource, OrderStatus, PaymentStatus};
    use chrono::Utc;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn sample_order(billed_km: i32, fee: i64) -> Order {
        Order {
            id: Uuid::nil(),
            display_id: 1024,
            customer_id: Uuid::nil(),
            service_id: Uuid::nil(),
            status: OrderStatus::PickedUp,
            payment_status: PaymentStatus::Pending,
            source: OrderSource::App,
            estimated_weight_kg: Some(dec(3)),
            actual_weight_kg: None,
            weight_confirmed: false,
            pieces: None,
            instructions: None,
            photo_urls: vec![],
            pickup_address: "Rua das Flores, 100".into(),
            pickup_lat: None,
            pickup_lng: None,
            pickup_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            pickup_window: "08:00-10:00".into(),
            delivery_address: None,
            delivery_date: None,
            delivery_window: None,
            distance_km: billed_km as f64,
            billed_km,
            delivery_fee: dec(fee),
            currency: "BRL".into(),
            service_price_per_kg: dec(5000),
            estimated_total: dec(0),
            final_total: None,
            assigned_staff_id: None,
            viewed_by_staff_at: None,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_customer() -> User {
        User {
            id: Uuid::nil(),
            name: "Maria Souza".into(),
            email: "maria@example.com".into(),
            phone: Some("+55 11 99999-0000".into()),
            password_hash: String::new(),
            role: Role::Customer,
            is_active: true,
            department: None,
            permissions: vec![],
            invitation_code: None,
            activated: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_settings() -> BusinessSettings {
        BusinessSettings {
            id: true,
            business_name: "Lavanderia Express".into(),
            document_number: None,
            address: None,
            phone: None,
            email: None,
            origin_lat: 0.0,
            origin_lng: 0.0,
            delivery_rate_per_km: dec(2000),
            pix_key: None,
            updated_at: Utc::now(),
        }
    }

    fn add_on(name: &str, quantity: i32, unit_price: i64) -> OrderAddOn {
        OrderAddOn {
            id: Uuid::nil(),
            order_id: Uuid::nil(),
            add_on_id: Uuid::nil(),
            name: name.into(),
            quantity,
            unit_price: dec(unit_price),
            line_total: dec(unit_price * quantity as i64),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn one_line_per_service_and_add_on() {
        let order = sample_order(5, 10000);
        let add_ons = vec![add_on("Lavagem de terno", 1, 10000)];
        let invoice = assemble_invoice(
            &order,
            &add_ons,
            &sample_customer(),
            "Lavagem padrão",
            &sample_settings(),
            "pt",
        );

        assert_eq!(invoice.lines.len(), 2);
        // 3 kg x 5000 + terno 10000
        assert_eq!(invoice.subtotal, dec(25000));
        // IVA fixo de 18%
        assert_eq!(invoice.vat_amount, dec(4500));
        assert_eq!(invoice.delivery_fee, Some(dec(10000)));
        assert_eq!(invoice.grand_total, dec(39500));
    }

    #[test]
    fn no_delivery_line_when_no_billed_distance() {
        let order = sample_order(0, 0);
        let invoice = assemble_invoice(
            &order,
            &[],
            &sample_customer(),
            "Lavagem padrão",
            &sample_settings(),
            "pt",
        );

        assert_eq!(invoice.delivery_fee, None);
        assert_eq!(invoice.grand_total, invoice.subtotal + invoice.vat_amount);
    }

    #[test]
    fn payment_block_defaults_to_cash_on_delivery_pending() {
        let order = sample_order(0, 0);
        let invoice = assemble_invoice(
            &order,
            &[],
            &sample_customer(),
            "Lavagem padrão",
            &sample_settings(),
            "pt",
        );

        assert_eq!(invoice.payment_method, "cash_on_delivery");
        assert_eq!(invoice.payment_status, PaymentStatus::Pending);
    }
}
