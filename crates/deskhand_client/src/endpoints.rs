use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::http::{ApiClient, BinaryBody};
use crate::types::{
    flatten_dictionary, ApiError, BatchUploadDto, DictionaryDto, DictionaryEntryDto,
    DocumentDto, DocumentListDto, HistoryDto, ImportRecordDto, StatisticsDto, SummaryDto,
    TemplateListDto, UploadAckDto, UploadForm,
};

#[derive(Debug, Serialize)]
struct IdsBody<'a> {
    document_ids: &'a [u64],
}

#[derive(Debug, Serialize)]
struct SummaryBody<'a> {
    document_ids: &'a [u64],
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct DictionaryEntryBody<'a> {
    category: &'a str,
    source: &'a str,
    replacement: &'a str,
}

#[derive(Debug, Serialize)]
struct DictionaryRemoveBody<'a> {
    category: &'a str,
    source: &'a str,
}

#[derive(Debug, Serialize)]
struct TemplateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    name: &'a str,
    description: &'a str,
    prompt_template: &'a str,
}

impl ApiClient {
    pub async fn statistics(&self) -> Result<StatisticsDto, ApiError> {
        self.get_json("/api/statistics", &[]).await
    }

    pub async fn documents(
        &self,
        search: &str,
        status: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<DocumentDto>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if !search.is_empty() {
            query.push(("search", search.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        let list: DocumentListDto = self.get_json("/api/documents", &query).await?;
        Ok(list.documents)
    }

    /// Submits a minutes recording with its declared parameters. Processing
    /// continues server-side; progress arrives over the event relay.
    pub async fn upload_minutes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        form: &UploadForm,
    ) -> Result<UploadAckDto, ApiError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let mut multipart = Form::new()
            .part("audio", part)
            .text("send_to_notion", "true");
        if !form.meeting_date.is_empty() {
            multipart = multipart.text("meeting_date", form.meeting_date.clone());
        }
        if !form.participants.is_empty() {
            multipart = multipart.text("participants", form.participants.clone());
        }
        if !form.conditions.is_empty() {
            multipart = multipart.text("conditions", form.conditions.clone());
        }
        if !form.email.is_empty() {
            multipart = multipart.text("email", form.email.clone());
        }
        if let Some(template_id) = &form.template_id {
            multipart = multipart.text("template_id", template_id.clone());
        }
        self.post_multipart("/upload", multipart).await
    }

    pub async fn ingest_files(
        &self,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<BatchUploadDto, ApiError> {
        let mut multipart = Form::new();
        for (name, bytes) in files {
            multipart = multipart.part("files", Part::bytes(bytes).file_name(name));
        }
        self.post_multipart("/api/upload/batch", multipart).await
    }

    pub async fn delete_document(&self, id: u64) -> Result<(), ApiError> {
        self.delete_unit(&format!("/api/documents/{id}")).await
    }

    pub async fn download_document(&self, id: u64) -> Result<BinaryBody, ApiError> {
        self.get_binary(&format!("/api/documents/{id}/download")).await
    }

    pub async fn export_markdown_zip(&self, ids: &[u64]) -> Result<BinaryBody, ApiError> {
        self.post_binary("/api/export/batch/markdown-zip", &IdsBody { document_ids: ids })
            .await
    }

    pub async fn summarize(&self, ids: &[u64], title: &str) -> Result<SummaryDto, ApiError> {
        self.post_json(
            "/api/export/summary",
            &SummaryBody {
                document_ids: ids,
                title,
            },
        )
        .await
    }

    pub async fn import_history(&self) -> Result<Vec<ImportRecordDto>, ApiError> {
        let history: HistoryDto = self.get_json("/api/import-history", &[]).await?;
        Ok(history.history)
    }

    pub async fn dictionary(&self) -> Result<Vec<DictionaryEntryDto>, ApiError> {
        let dto: DictionaryDto = self.get_json("/api/dictionary", &[]).await?;
        Ok(flatten_dictionary(dto))
    }

    pub async fn add_dictionary_entry(
        &self,
        category: &str,
        source: &str,
        replacement: &str,
    ) -> Result<(), ApiError> {
        self.post_unit(
            "/api/dictionary/entry",
            &DictionaryEntryBody {
                category,
                source,
                replacement,
            },
        )
        .await
    }

    pub async fn remove_dictionary_entry(
        &self,
        category: &str,
        source: &str,
    ) -> Result<(), ApiError> {
        self.delete_with_body("/api/dictionary/entry", &DictionaryRemoveBody { category, source })
            .await
    }

    pub async fn templates(&self) -> Result<TemplateListDto, ApiError> {
        self.get_json("/api/templates", &[]).await
    }

    pub async fn create_template(
        &self,
        id: &str,
        name: &str,
        description: &str,
        prompt: &str,
    ) -> Result<(), ApiError> {
        self.post_unit(
            "/api/templates",
            &TemplateBody {
                id: Some(id),
                name,
                description,
                prompt_template: prompt,
            },
        )
        .await
    }

    pub async fn update_template(
        &self,
        id: &str,
        name: &str,
        description: &str,
        prompt: &str,
    ) -> Result<(), ApiError> {
        self.put_unit(
            &format!("/api/templates/{id}"),
            &TemplateBody {
                id: None,
                name,
                description,
                prompt_template: prompt,
            },
        )
        .await
    }

    pub async fn delete_template(&self, id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/api/templates/{id}")).await
    }

    pub async fn set_default_template(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&format!("/api/templates/{id}/default")).await
    }
}
