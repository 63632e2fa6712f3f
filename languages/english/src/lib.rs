pub mod correction;
pub mod ecdict;
pub mod iciba;
pub mod synonyms;

pub use correction::{CorrectionLoadError, SymSpellOracle};
pub use ecdict::Ecdict;
pub use iciba::IcibaTranslator;
pub use synonyms::BigHugeLabsSynonyms;
