/// quick start - compute a home loan schedule and print the first year
use emi_amortisation::chrono::NaiveDate;
use emi_amortisation::{
    AmortisationEngine, AmortisationMethod, CalculationRequest, EngineConfig, ProductType,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emi_amortisation=info".into()),
        )
        .init();

    let engine = AmortisationEngine::new(EngineConfig::default())?;

    // 10 lakh home loan at 8.5% over 20 years
    let request = CalculationRequest::builder()
        .loan_id("HL-2024-0001")
        .principal(dec!(1000000))
        .interest_rate(dec!(8.5))
        .tenure(240)
        .product_type(ProductType::HomeLoan)
        .method(AmortisationMethod::ReducingBalance)
        .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid date")?)
        .requested_by("demo")
        .build();

    let schedule = engine.calculate_now(&request)?;

    println!("EMI:            {}", schedule.emi);
    println!("Total interest: {}", schedule.total_interest);
    println!("Total payment:  {}", schedule.total_payment);
    println!();
    println!("{:>3} {:>10} {:>12} {:>10} {:>10} {:>12}", "#", "due", "opening", "principal", "interest", "closing");
    for i in schedule.installments.iter().take(12) {
        println!(
            "{:>3} {:>10} {:>12} {:>10} {:>10} {:>12}",
            i.installment_number, i.due_date, i.opening_balance, i.principal, i.interest, i.closing_balance
        );
    }
    println!();
    println!("{}", schedule.audit_trail);

    Ok(())
}
