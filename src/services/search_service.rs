use crate::database::Database;
use crate::models::{
    Checklist, ChecklistResponse, Note, NoteResponse, SmartNote, SmartNoteResponse, Snippet,
    SnippetResponse,
};
use crate::utils::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub snippets: Vec<SnippetResponse>,
    pub notes: Vec<NoteResponse>,
    pub checklists: Vec<ChecklistResponse>,
    pub smart_notes: Vec<SmartNoteResponse>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.snippets.len() + self.notes.len() + self.checklists.len() + self.smart_notes.len()
    }
}

/// A query like "50%" must match the literal text, so LIKE metacharacters
/// are escaped before the pattern is built.
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

async fn scan_snippets(db: &Database, user_id: &str, pattern: &str) -> Result<Vec<Snippet>, AppError> {
    let rows = sqlx::query_as::<_, Snippet>(
        r"SELECT * FROM snippets WHERE user_id = ? AND (title LIKE ? ESCAPE '\' OR code LIKE ? ESCAPE '\') ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .bind(pattern)
    .bind(pattern)
    .fetch_all(db.pool())
    .await?;
    Ok(rows)
}

async fn scan_notes(db: &Database, user_id: &str, pattern: &str) -> Result<Vec<Note>, AppError> {
    let rows = sqlx::query_as::<_, Note>(
        r"SELECT * FROM notes WHERE user_id = ? AND (title LIKE ? ESCAPE '\' OR content LIKE ? ESCAPE '\') ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .bind(pattern)
    .bind(pattern)
    .fetch_all(db.pool())
    .await?;
    Ok(rows)
}

async fn scan_checklists(db: &Database, user_id: &str, pattern: &str) -> Result<Vec<Checklist>, AppError> {
    let rows = sqlx::query_as::<_, Checklist>(
        r"SELECT * FROM checklists WHERE user_id = ? AND title LIKE ? ESCAPE '\' ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .bind(pattern)
    .fetch_all(db.pool())
    .await?;
    Ok(rows)
}

async fn scan_smart_notes(db: &Database, user_id: &str, pattern: &str) -> Result<Vec<SmartNote>, AppError> {
    let rows = sqlx::query_as::<_, SmartNote>(
        r"SELECT * FROM smart_notes WHERE user_id = ? AND (title LIKE ? ESCAPE '\' OR html LIKE ? ESCAPE '\') ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .bind(pattern)
    .bind(pattern)
    .fetch_all(db.pool())
    .await?;
    Ok(rows)
}

/// Case-insensitive substring search across the caller's four content types,
/// executed as parallel LIKE scans.
pub async fn search(db: &Database, user_id: &str, query: &str) -> Result<SearchResults, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidRequest("Query parameter 'q' is required".to_string()));
    }

    let pattern = format!("%{}%", escape_like(query));

    let (snippets, notes, checklists, smart_notes) = tokio::try_join!(
        scan_snippets(db, user_id, &pattern),
        scan_notes(db, user_id, &pattern),
        scan_checklists(db, user_id, &pattern),
        scan_smart_notes(db, user_id, &pattern),
    )?;

    Ok(SearchResults {
        snippets: snippets.into_iter().map(SnippetResponse::from).collect(),
        notes: notes.into_iter().map(NoteResponse::from).collect(),
        checklists: checklists.into_iter().map(ChecklistResponse::from).collect(),
        smart_notes: smart_notes.into_iter().map(SmartNoteResponse::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like(r"back\slash"), r"back\\slash");
    }

    async fn seed(db: &Database) {
        sqlx::query("INSERT INTO users (id, email, created_at, updated_at) VALUES ('u1', 'a@b.c', 0, 0), ('u2', 'c@d.e', 0, 0)")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO snippets (id, user_id, title, code, created_at, updated_at) VALUES \
             ('s1', 'u1', 'Alpha sort', 'fn alpha() {}', 0, 1), \
             ('s2', 'u1', 'Beta', 'unrelated', 0, 2), \
             ('s3', 'u2', 'alpha elsewhere', 'x', 0, 3)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO notes (id, user_id, title, content, created_at, updated_at) VALUES \
             ('n1', 'u1', 'Groceries', 'buy alphalfa', 0, 1)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO checklists (id, user_id, title, created_at, updated_at) VALUES \
             ('c1', 'u1', 'ALPHA launch', 0, 1)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO smart_notes (id, user_id, title, html, created_at, updated_at) VALUES \
             ('m1', 'u1', 'Design', '<p>alpha channel</p>', 0, 1)",
        )
        .execute(db.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_search_spans_all_content_types() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        seed(&db).await;

        let results = search(&db, "u1", "alpha").await.unwrap();
        assert_eq!(results.snippets.len(), 1);
        assert_eq!(results.notes.len(), 1);
        assert_eq!(results.checklists.len(), 1);
        assert_eq!(results.smart_notes.len(), 1);
        assert_eq!(results.total(), 4);
    }

    #[tokio::test]
    async fn test_search_is_owner_scoped() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        seed(&db).await;

        let results = search(&db, "u2", "alpha").await.unwrap();
        assert_eq!(results.total(), 1);
        assert_eq!(results.snippets[0].id, "s3");
    }

    #[tokio::test]
    async fn test_wildcards_are_literal() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        seed(&db).await;

        // "%" as a query must not match every row
        let results = search(&db, "u1", "%").await.unwrap();
        assert_eq!(results.total(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let err = search(&db, "u1", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
