use std::sync::Arc;

use crate::{
    application::{
        ports::{CompletionProvider, DocumentExtractor, FileStorage},
        services::ConversationService,
        use_cases::{AskQuestionUseCase, UploadDocumentUseCase},
    },
    config::{AppConfig, ContextStoreKind},
    domain::repositories::ContextRepository,
    infrastructure::{
        LocalFileStorage, OpenAiCompletionProvider, create_connection_pool,
        database::{
            get_database_connection,
            repositories::{InMemoryContextRepository, PostgresContextRepository},
            run_migrations,
        },
        external_services::document_extractors::{FigureOcr, PdfExtractor},
    },
    presentation::http::{
        HttpServer,
        handlers::{AskHandler, DocumentHandler},
    },
};

pub struct AppContainer {
    // Repositories
    pub context_repository: Arc<dyn ContextRepository>,

    // External Services
    pub completion_provider: Arc<dyn CompletionProvider>,
    pub file_storage: Arc<dyn FileStorage>,
    pub document_extractor: Arc<dyn DocumentExtractor>,

    // Application Services
    pub conversation_service: Arc<ConversationService>,

    // Use Cases
    pub upload_document_use_case: Arc<UploadDocumentUseCase>,
    pub ask_question_use_case: Arc<AskQuestionUseCase>,

    // HTTP Handlers
    pub document_handler: Arc<DocumentHandler>,
    pub ask_handler: Arc<AskHandler>,
}

impl AppContainer {
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let context_repository = Self::context_repository(config)?;

        // Create external services
        let completion_provider: Arc<dyn CompletionProvider> =
            Arc::new(OpenAiCompletionProvider::new(config.completion.clone())?);

        let file_storage = LocalFileStorage::new(config.upload_dir.clone());
        file_storage
            .ensure_directory_exists()
            .await
            .map_err(|e| format!("Failed to create upload directory: {}", e))?;
        let file_storage: Arc<dyn FileStorage> = Arc::new(file_storage);

        let ocr = FigureOcr::new(config.tesseract_cmd.clone(), config.ocr_lang.clone());
        if !ocr.is_available() {
            tracing::warn!(command = %config.tesseract_cmd, "OCR unavailable; figures will carry empty text");
        }
        let document_extractor: Arc<dyn DocumentExtractor> =
            Arc::new(PdfExtractor::new(ocr, config.max_upload_bytes));

        // Create application services
        let conversation_service = Arc::new(
            ConversationService::new(context_repository.clone(), completion_provider.clone())
                .with_params(config.generation.clone())
                .with_max_write_retries(config.max_write_retries),
        );

        // Create use cases
        let upload_document_use_case = Arc::new(UploadDocumentUseCase::new(
            document_extractor.clone(),
            file_storage.clone(),
            context_repository.clone(),
        ));
        let ask_question_use_case =
            Arc::new(AskQuestionUseCase::new(conversation_service.clone()));

        // Create HTTP handlers
        let document_handler = Arc::new(DocumentHandler::new(upload_document_use_case.clone()));
        let ask_handler = Arc::new(AskHandler::new(ask_question_use_case.clone()));

        tracing::info!(
            store = ?config.context_store,
            model = %completion_provider.model_info(),
            "Application container ready"
        );

        Ok(Self {
            context_repository,
            completion_provider,
            file_storage,
            document_extractor,
            conversation_service,
            upload_document_use_case,
            ask_question_use_case,
            document_handler,
            ask_handler,
        })
    }

    fn context_repository(
        config: &AppConfig,
    ) -> Result<Arc<dyn ContextRepository>, Box<dyn std::error::Error>> {
        match config.context_store {
            ContextStoreKind::Memory => {
                tracing::warn!("Using in-memory context store; contexts are lost on restart");
                Ok(Arc::new(InMemoryContextRepository::new()))
            }
            ContextStoreKind::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or("DATABASE_URL not set")?;

                let db_pool = create_connection_pool(database_url, config.database_pool_size)?;
                let mut conn = get_database_connection(database_url)
                    .map_err(|e| format!("Failed to create database connection: {}", e))?;
                run_migrations(&mut conn)
                    .map_err(|e| format!("Failed to run database migrations: {}", e))?;

                Ok(Arc::new(PostgresContextRepository::new(db_pool)))
            }
        }
    }

    pub fn http_server(&self, config: &AppConfig) -> HttpServer {
        HttpServer::new(
            self.document_handler.clone(),
            self.ask_handler.clone(),
            self.completion_provider.clone(),
            config.socket_addr(),
            config.max_upload_bytes,
        )
    }
}
