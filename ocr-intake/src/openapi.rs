//! OpenAPI documentation configuration.
//!
//! Defines the OpenAPI spec for the intake API. The interactive documentation
//! is served at `/docs` and the raw document at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::api;
use crate::errors;

#[derive(OpenApi)]
#[openapi(
    paths(api::handlers::uploads::upload_file),
    components(schemas(
        api::models::uploads::UploadResponse,
        api::models::uploads::UploadStatus,
        errors::ErrorBody,
    )),
    tags(
        (name = "ocr", description = "Upload documents for OCR processing.

Uploads are validated against the configured size limit and extension allow-list, then stored
under a generated identifier. The identifier is the handle downstream OCR tooling uses to pick
the file up from the upload folder.")
    ),
    info(
        title = "OCR Intake API",
        version = "1.0.0",
        description = "File intake service for OCR processing.

## Errors

Errors are returned as JSON with a single `detail` field:

```json
{ \"detail\": \"File too large\" }
```

Validation failures (oversized files, disallowed extensions) return status 400; storage and
other internal failures return status 500 with the failure description.",
    ),
)]
pub struct ApiDoc;
