mod common;

use common::*;
use invoice_records::core::*;
use invoice_records::sales::{SalesRecordController, portal_indicator};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn today() -> chrono::NaiveDate {
    date(2024, 3, 10)
}

fn host_with_invoice() -> MemoryHost {
    init_tracing();
    let mut host = MemoryHost::standard();
    host.add_invoice(sales_invoice(
        "SINV-0001",
        &[
            ("SINV-0001-1", "SERVICE", dec!(10), dec!(20)),
            ("SINV-0001-2", "SUPPORT", dec!(1), dec!(100)),
        ],
    ));
    host
}

fn record(name: &str) -> RecordBuilder {
    RecordBuilder::new(name, Side::Sales, today())
        .party(CUSTOMER)
        .company(COMPANY)
        .currency("USD")
}

fn service(qty: Decimal) -> RecordItem {
    RecordItemBuilder::new("SERVICE", qty, dec!(20))
        .against("SINV-0001", "SINV-0001-1")
        .build()
}

fn invoice(host: &MemoryHost) -> &Invoice {
    host.invoice_ref(InvoiceKind::SalesInvoice, "SINV-0001")
}

#[test]
fn submit_bills_the_sales_invoice() {
    let mut host = host_with_invoice();
    let mut rec = record("SIR-0001").add_item(service(dec!(5))).build().unwrap();

    submit(&SalesRecordController::default(), &mut rec, &mut host, today()).unwrap();
    host.store(&rec);

    let inv = invoice(&host);
    assert_eq!(inv.items[0].billed_amt, dec!(100));
    assert_eq!(inv.items[1].billed_amt, Decimal::ZERO);
    assert_eq!(inv.per_billed, dec!(33.333333));
    assert_eq!(inv.billing_status, BillingStatus::PartlyBilled);
    assert_eq!(rec.party_account.as_deref(), Some(DEBTORS));
    assert_eq!(rec.remarks.as_deref(), Some("No Remarks"));
}

#[test]
fn submit_then_cancel_round_trips() {
    let mut host = host_with_invoice();
    let controller = SalesRecordController::default();
    let mut rec = record("SIR-0001")
        .add_item(service(dec!(10)))
        .add_item(
            RecordItemBuilder::new("SUPPORT", dec!(1), dec!(100))
                .against("SINV-0001", "SINV-0001-2")
                .build(),
        )
        .build()
        .unwrap();

    submit(&controller, &mut rec, &mut host, today()).unwrap();
    host.store(&rec);
    assert_eq!(invoice(&host).status, InvoiceStatus::Billed);

    cancel(&controller, &mut rec, &mut host, today()).unwrap();
    host.store(&rec);
    let inv = invoice(&host);
    assert!(inv.items.iter().all(|i| i.billed_amt.is_zero()));
    assert_eq!(inv.status, InvoiceStatus::Submitted);
    assert_eq!(inv.billing_status, BillingStatus::NotBilled);
}

#[test]
fn conversion_factor_must_match() {
    let host = host_with_invoice();
    let mut rec = record("SIR-0001")
        .add_item(
            RecordItemBuilder::new("SERVICE", dec!(1), dec!(20))
                .stock_uom("Nos", dec!(2))
                .against("SINV-0001", "SINV-0001-1")
                .build(),
        )
        .build()
        .unwrap();
    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    assert_eq!(err.validation().unwrap().field, "items[1].conversion_factor");
}

#[test]
fn currency_must_match_the_invoice() {
    let mut host = host_with_invoice();
    host.company_currencies.insert(COMPANY.into(), "EUR".into());
    let mut rec = record("SIR-0001")
        .conversion_rate(dec!(0.9))
        .add_item(service(dec!(1)))
        .build()
        .unwrap();
    let mut inv = sales_invoice("SINV-0001", &[("SINV-0001-1", "SERVICE", dec!(10), dec!(20))]);
    inv.currency = "EUR".into();
    host.add_invoice(inv);

    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    assert_eq!(
        err.validation().unwrap().message,
        "currency must be same as Sales Invoice SINV-0001 (EUR)"
    );
}

#[test]
fn project_must_belong_to_the_customer() {
    let mut host = host_with_invoice();
    host.projects.insert("PROJ-1".into(), Some("Customer B".into()));
    host.projects.insert("PROJ-2".into(), None);

    let mut rec = record("SIR-0001")
        .project("PROJ-1")
        .add_item(service(dec!(1)))
        .build()
        .unwrap();
    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    assert_eq!(
        err.validation().unwrap().message,
        "Customer Customer A does not belong to project PROJ-1"
    );

    let mut rec = record("SIR-0002")
        .project("PROJ-2")
        .add_item(service(dec!(1)))
        .build()
        .unwrap();
    save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap();
}

#[test]
fn cost_center_must_belong_to_the_company() {
    let host = host_with_invoice();
    let mut rec = record("SIR-0001")
        .add_item(
            RecordItemBuilder::new("SERVICE", dec!(1), dec!(20))
                .cost_center("Main - OT")
                .against("SINV-0001", "SINV-0001-1")
                .build(),
        )
        .build()
        .unwrap();
    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    let v = err.validation().unwrap();
    assert_eq!(v.field, "items[1].cost_center");
    assert_eq!(v.message, "Cost Center Main - OT does not belong to company Acme");
}

#[test]
fn closed_or_held_invoices_block() {
    let mut host = host_with_invoice();
    let key = (InvoiceKind::SalesInvoice, "SINV-0001".to_string());
    host.invoices.get_mut(&key).unwrap().status = InvoiceStatus::Closed;

    let mut rec = record("SIR-0001").add_item(service(dec!(1))).build().unwrap();
    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    assert!(err.to_string().contains("Sales Invoice SINV-0001 is Closed"));

    host.invoices.get_mut(&key).unwrap().status = InvoiceStatus::OnHold;
    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    assert!(err.to_string().contains("is On Hold"));
}

#[test]
fn rate_check_uses_the_selling_setting() {
    let host = host_with_invoice();
    let mut rec = record("SIR-0001")
        .add_item(
            RecordItemBuilder::new("SERVICE", dec!(1), dec!(25))
                .against("SINV-0001", "SINV-0001-1")
                .build(),
        )
        .build()
        .unwrap();

    let buying_only =
        SalesRecordController::new(SettingsBuilder::new().maintain_same_rate(true).build().unwrap());
    save(&buying_only, &mut rec.clone(), &host, today()).unwrap();

    let selling =
        SalesRecordController::new(SettingsBuilder::new().maintain_same_sales_rate(true).build().unwrap());
    let err = save(&selling, &mut rec, &host, today()).unwrap_err();
    assert_eq!(err.validation().unwrap().field, "items[1].rate");
}

#[test]
fn debit_to_must_be_receivable() {
    let host = host_with_invoice();
    let mut rec = record("SIR-0001")
        .party_account(CREDITORS)
        .add_item(service(dec!(1)))
        .build()
        .unwrap();
    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    assert!(err.to_string().contains("Debit To account is a Receivable account"));
}

#[test]
fn payments_are_rolled_up_on_save() {
    let host = host_with_invoice();
    let mut rec = record("SIR-0001")
        .add_item(service(dec!(5)))
        .add_payment("Cash", dec!(60))
        .add_payment("Cash", dec!(40))
        .build()
        .unwrap();
    save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap();
    assert_eq!(rec.paid_amount, dec!(100));
    assert_eq!(rec.base_paid_amount, dec!(100));
    assert!(rec.payments.iter().all(|p| p.account.as_deref() == Some("Cash - AC")));
}

#[test]
fn unknown_mode_of_payment_account() {
    let host = host_with_invoice();
    let mut rec = record("SIR-0001")
        .add_item(service(dec!(1)))
        .add_payment("Wire", dec!(20))
        .build()
        .unwrap();
    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    assert!(matches!(err, RecordError::Configuration(_)));
}

#[test]
fn write_off_account_defaults_from_company() {
    let host = host_with_invoice();
    let mut rec = record("SIR-0001")
        .write_off(dec!(2), None)
        .add_item(service(dec!(1)))
        .build()
        .unwrap();
    save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap();
    assert_eq!(rec.write_off_account.as_deref(), Some("Write Off - AC"));
    assert_eq!(rec.outstanding_amount, dec!(18));
}

#[test]
fn change_amount_needs_an_account() {
    let host = host_with_invoice();
    let controller = SalesRecordController::default();
    let mut rec = record("SIR-0001")
        .change_amount(dec!(5), None)
        .add_item(service(dec!(1)))
        .build()
        .unwrap();
    let err = save(&controller, &mut rec.clone(), &host, today()).unwrap_err();
    assert_eq!(err.to_string(), "configuration error: Please enter Account for Change Amount");

    rec.account_for_change_amount = Some("Cash - AC".into());
    save(&controller, &mut rec, &host, today()).unwrap();
}

#[test]
fn sales_records_leave_invoice_taxes_alone() {
    let mut host = MemoryHost::standard();
    let mut inv = sales_invoice("SINV-0001", &[("SINV-0001-1", "SERVICE", dec!(10), dec!(20))]);
    inv.taxes.push(
        TaxRowBuilder::new("VAT - AC", ChargeType::Actual)
            .name("SINV-0001-T1")
            .amount(dec!(30))
            .build(),
    );
    host.add_invoice(inv);

    let mut rec = record("SIR-0001")
        .add_item(service(dec!(1)))
        .add_tax(
            TaxRowBuilder::new("VAT - AC", ChargeType::Actual)
                .amount(dec!(3))
                .against("SINV-0001-T1")
                .build(),
        )
        .build()
        .unwrap();
    submit(&SalesRecordController::default(), &mut rec, &mut host, today()).unwrap();
    assert_eq!(invoice(&host).taxes[0].billed_amt, Decimal::ZERO);
    assert_eq!(invoice(&host).items[0].billed_amt, dec!(20));
}

#[test]
fn purchase_record_is_refused() {
    let host = host_with_invoice();
    let mut rec = RecordBuilder::new("PIR-1", Side::Purchase, today()).build().unwrap();
    let err = save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap_err();
    assert_eq!(err.validation().unwrap().field, "side");
}

#[test]
fn portal_indicator_after_save() {
    let host = host_with_invoice();
    let mut rec = record("SIR-0001").add_item(service(dec!(1))).build().unwrap();
    save(&SalesRecordController::default(), &mut rec, &host, today()).unwrap();
    assert_eq!(portal_indicator(&rec, today()).title, "Unpaid");
    assert_eq!(portal_indicator(&rec, date(2024, 5, 1)).title, "Overdue");
}
