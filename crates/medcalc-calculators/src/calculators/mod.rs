pub mod benzo_conversion;
pub mod bmi_bsa;
pub mod centor;
pub mod ckd_epi;
pub mod curb65;
pub mod fena;
pub mod has_bled;
pub mod hep;
pub mod phq9;
pub mod qtc;
pub mod wells_pe;

use medcalc_engine::config::CalculatorConfig;

/// Every built-in calculator, in catalog order.
pub fn all_calculators() -> Vec<CalculatorConfig> {
    vec![
        bmi_bsa::config(),
        fena::config(),
        ckd_epi::config(),
        qtc::config(),
        curb65::config(),
        phq9::config(),
        has_bled::config(),
        wells_pe::config(),
        centor::config(),
        hep::config(),
        benzo_conversion::config(),
    ]
}
