//! Files written during a run: field snapshots, the snapshot index, and tip
//! diagnostics.

mod index;
mod snapshot;
mod tip_log;

pub use index::SnapshotIndex;
pub use snapshot::{SnapshotDescriptor, SnapshotFile};
pub use tip_log::{TipLog, TipRecord};

/// Fields that can be written to a snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Deserialize)]
pub enum OutputField {
    #[serde(rename = "psi")]
    Psi,
    #[serde(rename = "u")]
    U,
    #[serde(rename = "psi_x")]
    PsiX,
    #[serde(rename = "psi_y")]
    PsiY,
    #[serde(rename = "grad_psi_norm2")]
    GradPsiNorm2,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A2")]
    A2,
    #[serde(rename = "Bxy")]
    Bxy,
}

impl OutputField {
    pub const ALL: [OutputField; 8] = [
        OutputField::Psi,
        OutputField::U,
        OutputField::PsiX,
        OutputField::PsiY,
        OutputField::GradPsiNorm2,
        OutputField::A,
        OutputField::A2,
        OutputField::Bxy,
    ];

    /// Dataset name inside a snapshot.
    #[inline]
    pub fn label(&self) -> &'static str {
        match self {
            OutputField::Psi => "psi",
            OutputField::U => "u",
            OutputField::PsiX => "psi_x",
            OutputField::PsiY => "psi_y",
            OutputField::GradPsiNorm2 => "grad_psi_norm2",
            OutputField::A => "A",
            OutputField::A2 => "A2",
            OutputField::Bxy => "Bxy",
        }
    }
}
