pub mod insurance;
pub mod nomenclature;

pub use insurance::InsuranceService;
pub use nomenclature::NomenclatureService;
