/// service facade - calculate once, retrieve the cached copy, record a payment
use emi_amortisation::chrono::{NaiveDate, TimeZone, Utc};
use emi_amortisation::{
    AmortisationMethod, AmortisationService, CalculationRequest, EngineConfig, PaymentStatus,
    SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emi_amortisation=debug".into()),
        )
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single().ok_or("invalid time")?,
    ));
    let service = AmortisationService::in_memory(EngineConfig::default())?;

    let request = CalculationRequest::builder()
        .loan_id("GL-2024-0007")
        .principal(dec!(150000))
        .interest_rate(dec!(14))
        .tenure(12)
        .method(AmortisationMethod::BulletPayment)
        .start_date(NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("invalid date")?)
        .build();

    let fresh = service.calculate(&request, &time)?;
    println!("calculated: emi {} cached {}", fresh.emi, fresh.cached);

    let stored = service.get_schedule("GL-2024-0007")?;
    println!("retrieved:  emi {} cached {}", stored.emi, stored.cached);

    // payment history lives on a copy, never on the calculated schedule
    let paid = stored.with_payment_recorded(
        1,
        PaymentStatus::Paid,
        NaiveDate::from_ymd_opt(2024, 7, 1),
        Some(stored.installments[0].emi),
    )?;
    println!("installment 1 status: {:?}", paid.installments[0].payment_status);

    if let Err(e) = service.get_schedule("GL-UNKNOWN") {
        println!("lookup failed with {}: {}", e.status_code(), e);
    }

    Ok(())
}
