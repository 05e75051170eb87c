//! Wires the engine, the stores and the file collaborators together.

use std::sync::Arc;

use registrar_core::conversation::{Collaborators, ConversationEngine};
use registrar_core::transport::{FileFetcher, Transport};
use registrar_infrastructure::{
    CsvRosterImporter, CsvStudentExporter, InMemorySessionStore, LocalAssetStore,
    RegistrarConfig, SqliteStore,
};

use crate::conversation_service::ConversationService;

/// Builds a [`ConversationService`] over `store`.
///
/// Uploaded images and exports go to the directories named in `config`;
/// sessions are kept in memory.
pub fn assemble(
    config: &RegistrarConfig,
    store: Arc<SqliteStore>,
    transport: Arc<dyn Transport>,
    fetcher: Arc<dyn FileFetcher>,
) -> ConversationService {
    let collaborators = Collaborators {
        students: store.clone(),
        admissions: store.clone(),
        supervisors: store.clone(),
        settings: store.clone(),
        assets: Arc::new(LocalAssetStore::new(
            config.storage.assets_dir.clone(),
            fetcher.clone(),
        )),
        files: fetcher,
        importer: Arc::new(CsvRosterImporter::new(store.clone())),
        exporter: Arc::new(CsvStudentExporter::new(
            store,
            config.storage.exports_dir.clone(),
        )),
    };

    let engine = ConversationEngine::new(collaborators, config.engine_settings());
    tracing::debug!("[Bootstrap] Conversation service assembled");
    ConversationService::new(engine, Arc::new(InMemorySessionStore::new()), transport)
}
