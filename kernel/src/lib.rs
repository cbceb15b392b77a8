// src/lib.rs
// Point d'entrée de la bibliothèque de l'ordonnanceur
#![cfg_attr(not(test), no_std)] // Pas de bibliothèque standard hors tests

// Import de alloc pour les allocations dynamiques
extern crate alloc;

// Modules
pub mod logger;
pub mod sync;
pub mod scheduler;

// Réexportations
pub use scheduler::{
    ContextSwitch, Level, Priority, SchedConfig, Scheduler, SchedulerError, SchedulerResult,
    SchedulerStats, Thread, ThreadBuilder, ThreadId, ThreadState,
};
pub use sync::{IntStatus, InterruptGate};
