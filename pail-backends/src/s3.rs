//! S3-compatible object store backend
//!
//! Works against AWS S3, MinIO, Cloudflare R2, and other S3-compatible
//! endpoints. Directories are synthetic: a "directory" exists when any
//! object key has its path as a prefix, optionally pinned by a zero-byte
//! `key/` marker object. uid/gid/mode are reported absent, never
//! fabricated.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use pail_core::{
    backend::{ByteRange, StorageBackend, TimeSpec, WriteMode},
    entry::{Entry, EntryKind},
    error::{PailError, PailResult},
    metadata::Metadata,
    ObjectUri, UnifiedPath,
};
use reqwest::{header, Client, Method, StatusCode};
use std::collections::BTreeMap;
use tracing::debug;

/// S3 backend configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Endpoint URL, e.g. "https://s3.us-east-1.amazonaws.com"
    pub endpoint: String,
    /// Signing region
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Path-style URLs (required for MinIO and most self-hosted stores)
    pub path_style: bool,
}

impl S3Config {
    /// AWS S3 configuration
    pub fn aws(region: &str, access_key: &str, secret_key: &str) -> Self {
        Self {
            endpoint: format!("https://s3.{}.amazonaws.com", region),
            region: region.to_string(),
            access_key_id: access_key.to_string(),
            secret_access_key: secret_key.to_string(),
            path_style: false,
        }
    }

    /// MinIO (or any path-style) configuration
    pub fn minio(endpoint: &str, access_key: &str, secret_key: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            region: "us-east-1".to_string(),
            access_key_id: access_key.to_string(),
            secret_access_key: secret_key.to_string(),
            path_style: true,
        }
    }

    /// Configuration from the conventional environment variables:
    /// `PAIL_S3_ENDPOINT` (custom endpoints imply path-style),
    /// `AWS_DEFAULT_REGION`/`AWS_REGION`, `AWS_ACCESS_KEY_ID`,
    /// `AWS_SECRET_ACCESS_KEY`.
    pub fn from_env() -> Self {
        let region = std::env::var("AWS_DEFAULT_REGION")
            .or_else(|_| std::env::var("AWS_REGION"))
            .unwrap_or_else(|_| "us-east-1".to_string());
        let (endpoint, path_style) = match std::env::var("PAIL_S3_ENDPOINT") {
            Ok(ep) => (ep, true),
            Err(_) => (format!("https://s3.{}.amazonaws.com", region), false),
        };
        Self {
            endpoint,
            region,
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
            path_style,
        }
    }
}

/// S3-compatible storage backend
pub struct S3Backend {
    scheme: String,
    config: S3Config,
    http: Client,
}

impl S3Backend {
    pub fn new(scheme: impl Into<String>, config: S3Config) -> Self {
        Self {
            scheme: scheme.into(),
            config,
            http: Client::new(),
        }
    }

    fn uri<'a>(&self, path: &'a UnifiedPath) -> PailResult<&'a ObjectUri> {
        path.as_remote()
            .ok_or_else(|| PailError::InvalidArgument(format!("not an object path: {path}")))
    }

    /// URL for an object; key segments are percent-encoded.
    fn object_url(&self, bucket: &str, key: &str) -> String {
        let encoded = encode_key(key);
        if self.config.path_style {
            format!(
                "{}/{}/{}",
                self.config.endpoint.trim_end_matches('/'),
                bucket,
                encoded
            )
        } else {
            let host = self
                .config
                .endpoint
                .replace("://", &format!("://{}.", bucket));
            format!("{}/{}", host.trim_end_matches('/'), encoded)
        }
    }

    fn bucket_url(&self, bucket: &str) -> String {
        if self.config.path_style {
            format!("{}/{}", self.config.endpoint.trim_end_matches('/'), bucket)
        } else {
            self.config
                .endpoint
                .replace("://", &format!("://{}.", bucket))
                .trim_end_matches('/')
                .to_string()
        }
    }

    /// Sign a request with AWS Signature Version 4.
    fn sign_request(
        &self,
        method: &Method,
        url: &str,
        headers: &mut BTreeMap<String, String>,
        payload_hash: &str,
    ) -> PailResult<String> {
        let now = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        headers.insert("x-amz-date".to_string(), amz_date.clone());
        headers.insert("x-amz-content-sha256".to_string(), payload_hash.to_string());

        let parsed =
            url::Url::parse(url).map_err(|e| PailError::InvalidArgument(e.to_string()))?;
        let host = parsed.host_str().unwrap_or("");
        let path = parsed.path();
        let query = parsed.query().unwrap_or("");

        headers.insert("host".to_string(), host.to_string());

        let signed_headers: Vec<&str> = headers.keys().map(|s| s.as_str()).collect();
        let signed_headers_str = signed_headers.join(";");

        let canonical_headers: String = headers
            .iter()
            .map(|(k, v)| format!("{}:{}\n", k.to_lowercase(), v.trim()))
            .collect();

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method.as_str(),
            path,
            query,
            canonical_headers,
            signed_headers_str,
            payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.config.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let k_date = hmac_sha256(
            format!("AWS4{}", self.config.secret_access_key).as_bytes(),
            date_stamp.as_bytes(),
        );
        let k_region = hmac_sha256(&k_date, self.config.region.as_bytes());
        let k_service = hmac_sha256(&k_region, b"s3");
        let k_signing = hmac_sha256(&k_service, b"aws4_request");
        let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

        Ok(format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.config.access_key_id, credential_scope, signed_headers_str, signature
        ))
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        extra_headers: BTreeMap<String, String>,
        body: Option<Bytes>,
    ) -> PailResult<reqwest::Response> {
        let payload_hash = match &body {
            Some(data) => sha256_hex(data),
            None => sha256_hex(b""),
        };

        let mut headers = extra_headers;
        let auth = self.sign_request(&method, url, &mut headers, &payload_hash)?;

        let mut request = self.http.request(method, url);
        for (k, v) in &headers {
            request = request.header(k, v);
        }
        request = request.header(header::AUTHORIZATION, auth);
        if let Some(data) = body {
            request = request.body(data.to_vec());
        }

        request
            .send()
            .await
            .map_err(|e| PailError::Network(e.to_string()))
    }

    fn status_error(&self, status: StatusCode, detail: String, path: &UnifiedPath) -> PailError {
        match status {
            StatusCode::NOT_FOUND => PailError::NotFound(path.to_string()),
            StatusCode::UNAUTHORIZED => PailError::Auth(detail),
            StatusCode::FORBIDDEN => PailError::PermissionDenied(path.to_string()),
            _ => PailError::ProviderApi {
                scheme: self.scheme.clone(),
                message: format!("{}: {}", status, detail),
            },
        }
    }

    /// One ListObjectsV2 page.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        continuation: Option<&str>,
    ) -> PailResult<ListPage> {
        // Query parameters in canonical (sorted) order for signing
        let mut url = self.bucket_url(bucket);
        url.push('?');
        if let Some(token) = continuation {
            url.push_str(&format!(
                "continuation-token={}&",
                urlencoding::encode(token)
            ));
        }
        if let Some(d) = delimiter {
            url.push_str(&format!("delimiter={}&", urlencoding::encode(d)));
        }
        url.push_str("list-type=2");
        if !prefix.is_empty() {
            url.push_str(&format!("&prefix={}", urlencoding::encode(prefix)));
        }

        debug!(bucket, prefix, "listing objects");
        let response = self.send(Method::GET, &url, BTreeMap::new(), None).await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PailError::ProviderApi {
                scheme: self.scheme.clone(),
                message: format!("{}: {}", status, text),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| PailError::Network(e.to_string()))?;
        parse_list_page(&text)
    }

    /// All objects and common prefixes under a prefix (follows
    /// continuation tokens).
    async fn list_all(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> PailResult<ListPage> {
        let mut combined = ListPage::default();
        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .list_page(bucket, prefix, delimiter, continuation.as_deref())
                .await?;
            combined.objects.extend(page.objects);
            combined.common_prefixes.extend(page.common_prefixes);
            match page.continuation_token {
                Some(token) if page.is_truncated => continuation = Some(token),
                _ => break,
            }
        }
        Ok(combined)
    }

    /// Server-side copy of a single object.
    async fn copy_object(
        &self,
        src: &ObjectUri,
        dest: &ObjectUri,
        replace_metadata: bool,
    ) -> PailResult<()> {
        let url = self.object_url(&dest.bucket, &dest.key);
        let mut headers = BTreeMap::new();
        headers.insert(
            "x-amz-copy-source".to_string(),
            format!("/{}/{}", src.bucket, encode_key(&src.key)),
        );
        if replace_metadata {
            headers.insert("x-amz-metadata-directive".to_string(), "REPLACE".to_string());
        }

        let response = self.send(Method::PUT, &url, headers, None).await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let path = UnifiedPath::Remote(src.clone());
            return Err(self.status_error(status, text, &path));
        }
        Ok(())
    }

    fn object_entry(&self, bucket: &str, obj: &S3Object) -> Entry {
        let mut metadata = Metadata::new();
        metadata.size = Some(obj.size);
        metadata.modified = obj.last_modified;
        metadata.etag = obj.etag.clone();
        Entry {
            path: UnifiedPath::Remote(ObjectUri {
                scheme: self.scheme.clone(),
                bucket: bucket.to_string(),
                key: obj.key.trim_end_matches('/').to_string(),
            }),
            kind: EntryKind::File,
            metadata,
        }
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn synthetic_directories(&self) -> bool {
        true
    }

    async fn stat(&self, path: &UnifiedPath) -> PailResult<Entry> {
        let uri = self.uri(path)?;

        if uri.key.is_empty() {
            // Bucket root behaves as a directory
            return Ok(Entry::directory(path.clone(), Metadata::new()));
        }

        let url = self.object_url(&uri.bucket, &uri.key);
        let response = self.send(Method::HEAD, &url, BTreeMap::new(), None).await?;

        if response.status() == StatusCode::NOT_FOUND {
            // A directory exists when any key has this path as a prefix
            let page = self
                .list_page(&uri.bucket, &uri.key_prefix(), Some("/"), None)
                .await?;
            if !page.objects.is_empty() || !page.common_prefixes.is_empty() {
                return Ok(Entry::directory(path.clone(), Metadata::new()));
            }
            return Err(PailError::NotFound(path.to_string()));
        }
        if !response.status().is_success() {
            return Err(self.status_error(response.status(), String::new(), path));
        }

        let headers = response.headers();
        let mut metadata = Metadata::new();
        if let Some(len) = headers.get(header::CONTENT_LENGTH) {
            metadata.size = len.to_str().ok().and_then(|s| s.parse().ok());
        }
        if let Some(modified) = headers.get(header::LAST_MODIFIED) {
            if let Ok(s) = modified.to_str() {
                metadata.modified = DateTime::parse_from_rfc2822(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc));
            }
        }
        if let Some(etag) = headers.get(header::ETAG) {
            metadata.etag = etag.to_str().ok().map(|s| s.trim_matches('"').to_string());
        }

        Ok(Entry::file(path.clone(), metadata))
    }

    async fn list(&self, path: &UnifiedPath) -> PailResult<Vec<Entry>> {
        let uri = self.uri(path)?;
        let prefix = uri.key_prefix();
        let page = self.list_all(&uri.bucket, &prefix, Some("/")).await?;

        if !uri.key.is_empty() && page.objects.is_empty() && page.common_prefixes.is_empty() {
            // Distinguish empty synthetic directory from nothing at all
            return match self.stat(path).await {
                Ok(entry) if entry.is_directory() => Ok(Vec::new()),
                Ok(_) => Err(PailError::NotADirectory(path.to_string())),
                Err(e) => Err(e),
            };
        }

        let mut entries = Vec::new();
        for obj in &page.objects {
            // The directory's own marker object is not a child
            if obj.key == prefix || obj.key.len() <= prefix.len() {
                continue;
            }
            entries.push(self.object_entry(&uri.bucket, obj));
        }
        for cp in &page.common_prefixes {
            let key = cp.trim_end_matches('/');
            if key.is_empty() {
                continue;
            }
            entries.push(Entry::directory(
                UnifiedPath::Remote(ObjectUri {
                    scheme: self.scheme.clone(),
                    bucket: uri.bucket.clone(),
                    key: key.to_string(),
                }),
                Metadata::new(),
            ));
        }
        Ok(entries)
    }

    async fn read(&self, path: &UnifiedPath, range: Option<ByteRange>) -> PailResult<Bytes> {
        let uri = self.uri(path)?;
        let url = self.object_url(&uri.bucket, &uri.key);

        let mut headers = BTreeMap::new();
        if let Some((start, end)) = range {
            let value = match end {
                Some(end) if end > start => format!("bytes={}-{}", start, end - 1),
                Some(_) => return Ok(Bytes::new()),
                None => format!("bytes={}-", start),
            };
            headers.insert("range".to_string(), value);
        }

        let response = self.send(Method::GET, &url, headers, None).await?;
        let status = response.status();
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            // Requested past the end; nothing new to read
            return Ok(Bytes::new());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.status_error(status, text, path));
        }

        response
            .bytes()
            .await
            .map_err(|e| PailError::Network(e.to_string()))
    }

    async fn write(&self, path: &UnifiedPath, data: Bytes, mode: WriteMode) -> PailResult<Entry> {
        let uri = self.uri(path)?;

        // Append is read+concat+put: object stores cannot extend in
        // place, so concurrent appenders can lose data.
        let payload = match mode {
            WriteMode::Overwrite => data,
            WriteMode::Append => match self.read(path, None).await {
                Ok(existing) => {
                    let mut combined = Vec::with_capacity(existing.len() + data.len());
                    combined.extend_from_slice(&existing);
                    combined.extend_from_slice(&data);
                    Bytes::from(combined)
                }
                Err(e) if e.is_not_found() => data,
                Err(e) => return Err(e),
            },
        };

        let url = self.object_url(&uri.bucket, &uri.key);
        let response = self.send(Method::PUT, &url, BTreeMap::new(), Some(payload)).await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.status_error(status, text, path));
        }
        self.stat(path).await
    }

    async fn create_dir(
        &self,
        path: &UnifiedPath,
        _parents: bool,
        exist_ok: bool,
    ) -> PailResult<()> {
        let uri = self.uri(path)?;
        if uri.key.is_empty() {
            // Bucket root always exists
            return if exist_ok {
                Ok(())
            } else {
                Err(PailError::AlreadyExists(path.to_string()))
            };
        }

        if !exist_ok {
            match self.stat(path).await {
                Ok(_) => return Err(PailError::AlreadyExists(path.to_string())),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }

        // Zero-byte marker object pins the otherwise-synthetic directory
        let marker = format!("{}/", uri.key);
        let url = self.object_url(&uri.bucket, &marker);
        let response = self
            .send(Method::PUT, &url, BTreeMap::new(), Some(Bytes::new()))
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.status_error(status, text, path));
        }
        Ok(())
    }

    async fn remove_file(&self, path: &UnifiedPath) -> PailResult<()> {
        let uri = self.uri(path)?;
        let url = self.object_url(&uri.bucket, &uri.key);
        let response = self.send(Method::DELETE, &url, BTreeMap::new(), None).await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::NO_CONTENT {
            let text = response.text().await.unwrap_or_default();
            return Err(self.status_error(status, text, path));
        }
        Ok(())
    }

    async fn remove_dir(&self, path: &UnifiedPath) -> PailResult<()> {
        let uri = self.uri(path)?;
        let prefix = uri.key_prefix();
        let page = self.list_all(&uri.bucket, &prefix, Some("/")).await?;

        let has_children = page
            .objects
            .iter()
            .any(|o| o.key != prefix && o.key.len() > prefix.len())
            || !page.common_prefixes.is_empty();
        if has_children {
            return Err(PailError::DirectoryNotEmpty(path.to_string()));
        }

        let has_marker = page.objects.iter().any(|o| o.key == prefix);
        if !has_marker {
            return Err(PailError::NotFound(path.to_string()));
        }

        let url = self.object_url(&uri.bucket, &prefix);
        let response = self.send(Method::DELETE, &url, BTreeMap::new(), None).await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::NO_CONTENT {
            let text = response.text().await.unwrap_or_default();
            return Err(self.status_error(status, text, path));
        }
        Ok(())
    }

    async fn rename(&self, src: &UnifiedPath, dest: &UnifiedPath) -> PailResult<Entry> {
        // No rename primitive: copy then delete, not atomic
        let entry = self.copy(src, dest, true).await?;
        self.remove_file(src).await?;
        Ok(entry)
    }

    async fn copy(
        &self,
        src: &UnifiedPath,
        dest: &UnifiedPath,
        _preserve: bool,
    ) -> PailResult<Entry> {
        let src_uri = self.uri(src)?;
        let dest_uri = self.uri(dest)?;
        self.copy_object(src_uri, dest_uri, false).await?;
        self.stat(dest).await
    }

    async fn set_times(
        &self,
        path: &UnifiedPath,
        atime: Option<TimeSpec>,
        mtime: Option<TimeSpec>,
    ) -> PailResult<()> {
        if matches!(atime, Some(TimeSpec::At(_))) || matches!(mtime, Some(TimeSpec::At(_))) {
            return Err(PailError::Unsupported(
                "cannot set explicit timestamps on object storage".into(),
            ));
        }
        match mtime {
            Some(TimeSpec::Now) => {
                // Self-copy refreshes the object's modification time
                let uri = self.uri(path)?;
                self.copy_object(uri, uri, true).await
            }
            _ => {
                debug!(%path, "object store has no access time; nothing to update");
                Ok(())
            }
        }
    }
}

/// Percent-encode an object key, preserving `/` separators.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, Default)]
struct S3Object {
    key: String,
    size: u64,
    last_modified: Option<DateTime<Utc>>,
    etag: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct ListPage {
    objects: Vec<S3Object>,
    common_prefixes: Vec<String>,
    is_truncated: bool,
    continuation_token: Option<String>,
}

/// Parse a ListObjectsV2 XML response.
fn parse_list_page(xml: &str) -> PailResult<ListPage> {
    let mut page = ListPage::default();

    for block in xml_blocks(xml, "Contents") {
        let mut obj = S3Object::default();
        if let Some(key) = xml_value(block, "Key") {
            obj.key = xml_unescape(key);
        }
        if let Some(size) = xml_value(block, "Size") {
            obj.size = size.parse().unwrap_or(0);
        }
        if let Some(modified) = xml_value(block, "LastModified") {
            obj.last_modified = DateTime::parse_from_rfc3339(modified)
                .ok()
                .map(|dt| dt.with_timezone(&Utc));
        }
        if let Some(etag) = xml_value(block, "ETag") {
            obj.etag = Some(xml_unescape(etag).trim_matches('"').to_string());
        }
        page.objects.push(obj);
    }

    for block in xml_blocks(xml, "CommonPrefixes") {
        if let Some(prefix) = xml_value(block, "Prefix") {
            page.common_prefixes.push(xml_unescape(prefix));
        }
    }

    if let Some(truncated) = xml_value(xml, "IsTruncated") {
        page.is_truncated = truncated == "true";
    }
    page.continuation_token = xml_value(xml, "NextContinuationToken").map(xml_unescape);

    Ok(page)
}

/// All inner texts of `<tag>...</tag>` blocks.
fn xml_blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let mut blocks = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        match after.find(&close) {
            Some(end) => {
                blocks.push(&after[..end]);
                rest = &after[end + close.len()..];
            }
            None => break,
        }
    }
    blocks
}

/// First `<tag>value</tag>` inside a fragment.
fn xml_value<'a>(fragment: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = fragment.find(&open)? + open.len();
    let end = fragment[start..].find(&close)?;
    Some(&fragment[start..start + end])
}

fn xml_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn sha256_hex(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
  <Name>bucket</Name>
  <Prefix>logs/</Prefix>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>token123</NextContinuationToken>
  <Contents>
    <Key>logs/app.log</Key>
    <LastModified>2024-03-01T10:00:00.000Z</LastModified>
    <ETag>&quot;abc123&quot;</ETag>
    <Size>2048</Size>
  </Contents>
  <Contents>
    <Key>logs/</Key>
    <LastModified>2024-02-01T00:00:00.000Z</LastModified>
    <Size>0</Size>
  </Contents>
  <CommonPrefixes>
    <Prefix>logs/archive/</Prefix>
  </CommonPrefixes>
</ListBucketResult>"#;

    #[test]
    fn test_parse_list_page() {
        let page = parse_list_page(SAMPLE_LISTING).unwrap();
        assert_eq!(page.objects.len(), 2);
        assert_eq!(page.objects[0].key, "logs/app.log");
        assert_eq!(page.objects[0].size, 2048);
        assert_eq!(page.objects[0].etag.as_deref(), Some("abc123"));
        assert!(page.objects[0].last_modified.is_some());
        assert_eq!(page.common_prefixes, vec!["logs/archive/"]);
        assert!(page.is_truncated);
        assert_eq!(page.continuation_token.as_deref(), Some("token123"));
    }

    #[test]
    fn test_parse_list_page_empty() {
        let page = parse_list_page("<ListBucketResult></ListBucketResult>").unwrap();
        assert!(page.objects.is_empty());
        assert!(page.common_prefixes.is_empty());
        assert!(!page.is_truncated);
    }

    #[test]
    fn test_xml_unescape() {
        assert_eq!(xml_unescape("a&amp;b"), "a&b");
        assert_eq!(xml_unescape("&lt;x&gt;"), "<x>");
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("a/b c/d"), "a/b%20c/d");
        assert_eq!(encode_key("plain"), "plain");
    }

    #[test]
    fn test_object_url_styles() {
        let path_style = S3Backend::new("s3", S3Config::minio("http://localhost:9000", "k", "s"));
        assert_eq!(
            path_style.object_url("bkt", "a/b.txt"),
            "http://localhost:9000/bkt/a/b.txt"
        );

        let virtual_host = S3Backend::new("s3", S3Config::aws("us-east-1", "k", "s"));
        assert_eq!(
            virtual_host.object_url("bkt", "a/b.txt"),
            "https://bkt.s3.us-east-1.amazonaws.com/a/b.txt"
        );
    }

    #[test]
    fn test_sha256_hex_empty() {
        // Well-known SHA-256 of the empty string, used for unsigned payloads
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
