//! Integration tests for titles and title-genre links.

use assert_matches::assert_matches;
use sqlx::PgPool;
use yamdb_core::error::CoreError;
use yamdb_db::models::category::CreateCategory;
use yamdb_db::models::genre::CreateGenre;
use yamdb_db::models::review::CreateReview;
use yamdb_db::models::title::{CreateTitle, TitleListParams, UpdateTitle};
use yamdb_db::models::user::CreateUser;
use yamdb_db::repositories::{CategoryRepo, GenreRepo, ReviewRepo, TitleRepo, UserRepo};
use yamdb_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_title(name: &str, year: i32) -> CreateTitle {
    CreateTitle {
        name: name.to_string(),
        year,
        description: None,
        category_id: None,
        genre_ids: vec![],
    }
}

async fn genre(pool: &PgPool, name: &str, slug: &str) -> i64 {
    GenreRepo::create(
        pool,
        &CreateGenre {
            name: name.to_string(),
            slug: slug.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
        },
    )
    .await
    .unwrap()
    .id
}

async fn link_count(pool: &PgPool, title_id: i64) -> i64 {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM title_genres WHERE title_id = $1")
        .bind(title_id)
        .fetch_one(pool)
        .await
        .unwrap();
    n
}

// ---------------------------------------------------------------------------
// Test: Title CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_crud(pool: PgPool) {
    let title = TitleRepo::create(
        &pool,
        &CreateTitle {
            description: Some("A hobbit goes on a walk".to_string()),
            ..new_title("The Fellowship of the Ring", 1954)
        },
    )
    .await
    .unwrap();
    assert_eq!(title.year, 1954);
    assert_eq!(title.category_id, None);
    assert_eq!(title.rating, None); // unset until populated externally

    let updated = TitleRepo::update(
        &pool,
        title.id,
        &UpdateTitle {
            year: Some(1955),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("title should exist");
    assert_eq!(updated.year, 1955);
    assert_eq!(updated.name, "The Fellowship of the Ring");
    assert_eq!(updated.description.as_deref(), Some("A hobbit goes on a walk"));

    let rated = TitleRepo::set_rating(&pool, title.id, Some(9))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rated.rating, Some(9));

    let cleared = TitleRepo::set_rating(&pool, title.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.rating, None);

    assert!(TitleRepo::delete(&pool, title.id).await.unwrap());
    assert!(TitleRepo::find_by_id(&pool, title.id).await.unwrap().is_none());
    assert!(!TitleRepo::delete(&pool, title.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_clears_category_and_description(pool: PgPool) {
    let films = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "Films".to_string(),
            slug: "films".to_string(),
        },
    )
    .await
    .unwrap();
    let title = TitleRepo::create(
        &pool,
        &CreateTitle {
            description: Some("Silent era".to_string()),
            category_id: Some(films.id),
            ..new_title("Metropolis", 1927)
        },
    )
    .await
    .unwrap();

    // Untouched nullable fields keep their values.
    let renamed = TitleRepo::update(
        &pool,
        title.id,
        &UpdateTitle {
            name: Some("Metropolis (restored)".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.category_id, Some(films.id));
    assert_eq!(renamed.description.as_deref(), Some("Silent era"));

    let cleared = TitleRepo::update(
        &pool,
        title.id,
        &UpdateTitle {
            description: Some(None),
            category_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.category_id, None);
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.name, "Metropolis (restored)");

    let recategorised = TitleRepo::update(
        &pool,
        title.id,
        &UpdateTitle {
            category_id: Some(Some(films.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(recategorised.category_id, Some(films.id));
    assert_eq!(recategorised.description, None);

    // The category itself is untouched by clearing the reference.
    assert!(CategoryRepo::find_by_id(&pool, films.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_title_with_unknown_category_fails(pool: PgPool) {
    let err = TitleRepo::create(
        &pool,
        &CreateTitle {
            category_id: Some(777),
            ..new_title("Ghost", 1990)
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        DbError::ForeignKeyViolation { ref constraint } if constraint == "fk_titles_category_id"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_title_with_unknown_genre_rolls_back(pool: PgPool) {
    let err = TitleRepo::create(
        &pool,
        &CreateTitle {
            genre_ids: vec![555],
            ..new_title("Orphan", 2001)
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, DbError::ForeignKeyViolation { .. });

    let titles = TitleRepo::list(&pool, &TitleListParams::default()).await.unwrap();
    assert!(titles.is_empty(), "title insert must roll back with its links");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters(pool: PgPool) {
    let books = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "Books".to_string(),
            slug: "books".to_string(),
        },
    )
    .await
    .unwrap();
    let fantasy = genre(&pool, "Fantasy", "fantasy").await;

    let hobbit = TitleRepo::create(
        &pool,
        &CreateTitle {
            category_id: Some(books.id),
            genre_ids: vec![fantasy],
            ..new_title("The Hobbit", 1937)
        },
    )
    .await
    .unwrap();
    let dune = TitleRepo::create(
        &pool,
        &CreateTitle {
            category_id: Some(books.id),
            ..new_title("Dune", 1965)
        },
    )
    .await
    .unwrap();
    TitleRepo::create(&pool, &new_title("Alien", 1979))
        .await
        .unwrap();

    let all = TitleRepo::list(&pool, &TitleListParams::default()).await.unwrap();
    let names: Vec<_> = all.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alien", "Dune", "The Hobbit"]);

    let in_books = TitleRepo::list(
        &pool,
        &TitleListParams {
            category_id: Some(books.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let ids: Vec<_> = in_books.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![dune.id, hobbit.id]);

    let in_fantasy = TitleRepo::list(
        &pool,
        &TitleListParams {
            genre_id: Some(fantasy),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(in_fantasy.len(), 1);
    assert_eq!(in_fantasy[0].id, hobbit.id);

    let from_1965 = TitleRepo::list(
        &pool,
        &TitleListParams {
            year: Some(1965),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(from_1965.len(), 1);
    assert_eq!(from_1965[0].id, dune.id);

    let paged = TitleRepo::list(
        &pool,
        &TitleListParams {
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].name, "Dune");
}

// ---------------------------------------------------------------------------
// Test: Genre links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_genre_links(pool: PgPool) {
    let scifi = genre(&pool, "Sci-Fi", "sci-fi").await;
    let horror = genre(&pool, "Horror", "horror").await;
    let title = TitleRepo::create(
        &pool,
        &CreateTitle {
            genre_ids: vec![scifi],
            ..new_title("Alien", 1979)
        },
    )
    .await
    .unwrap();

    // Adding a new genre links it; adding it again is a no-op.
    assert!(TitleRepo::add_genre(&pool, title.id, horror).await.unwrap());
    assert!(!TitleRepo::add_genre(&pool, title.id, horror).await.unwrap());
    assert_eq!(link_count(&pool, title.id).await, 2);

    let genres = TitleRepo::genres_for_title(&pool, title.id).await.unwrap();
    let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Horror", "Sci-Fi"]);

    let labels: Vec<_> = TitleRepo::genre_links(&pool, title.id)
        .await
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(labels, vec!["Alien Horror", "Alien Sci-Fi"]);

    assert!(TitleRepo::remove_genre(&pool, title.id, scifi).await.unwrap());
    assert!(!TitleRepo::remove_genre(&pool, title.id, scifi).await.unwrap());
    assert_eq!(link_count(&pool, title.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_genres_replaces_links(pool: PgPool) {
    let a = genre(&pool, "A", "a").await;
    let b = genre(&pool, "B", "b").await;
    let c = genre(&pool, "C", "c").await;
    let title = TitleRepo::create(
        &pool,
        &CreateTitle {
            genre_ids: vec![a, b],
            ..new_title("Mixed", 2000)
        },
    )
    .await
    .unwrap();

    let links = TitleRepo::set_genres(&pool, title.id, &[c, c, b]).await.unwrap();
    assert_eq!(links.len(), 2, "duplicate ids collapse to one link");

    let ids: Vec<_> = TitleRepo::genres_for_title(&pool, title.id)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(ids, vec![b, c]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_genres_on_missing_title(pool: PgPool) {
    let err = TitleRepo::set_genres(&pool, 31_337, &[]).await.unwrap_err();
    assert_matches!(
        err,
        DbError::Core(CoreError::NotFound { entity: "Title", id: 31_337 })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_link_rejected_by_schema(pool: PgPool) {
    let g = genre(&pool, "Noir", "noir").await;
    let title = TitleRepo::create(
        &pool,
        &CreateTitle {
            genre_ids: vec![g],
            ..new_title("Chinatown", 1974)
        },
    )
    .await
    .unwrap();

    let err = sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES ($1, $2)")
        .bind(title.id)
        .bind(g)
        .execute(&pool)
        .await
        .map_err(DbError::from)
        .unwrap_err();
    assert_matches!(
        err,
        DbError::UniqueViolation { ref constraint } if constraint == "uq_title_genres_title_genre"
    );
}

// ---------------------------------------------------------------------------
// Test: Deletion policy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_title_removes_links_and_detaches_reviews(pool: PgPool) {
    let g = genre(&pool, "War", "war").await;
    let title = TitleRepo::create(
        &pool,
        &CreateTitle {
            genre_ids: vec![g],
            ..new_title("Come and See", 1985)
        },
    )
    .await
    .unwrap();
    let link_id: i64 = TitleRepo::genre_links(&pool, title.id).await.unwrap()[0].id;

    let author = user(&pool, "critic").await;
    let review = ReviewRepo::create(
        &pool,
        &CreateReview {
            author_id: author,
            title_id: title.id,
            text: "Devastating.".to_string(),
            score: 10,
        },
    )
    .await
    .unwrap();

    assert!(TitleRepo::delete(&pool, title.id).await.unwrap());

    let (links,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM title_genres WHERE id = $1")
        .bind(link_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 0, "genre link must be deleted with the title");

    assert!(GenreRepo::find_by_id(&pool, g).await.unwrap().is_some());

    let review_after = ReviewRepo::find_by_id(&pool, review.id)
        .await
        .unwrap()
        .expect("review must survive title deletion");
    assert_eq!(review_after.title_id, None);
    assert_eq!(review_after.text, "Devastating.");
    assert_eq!(review_after.score, 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_label_truncated(pool: PgPool) {
    let title = TitleRepo::create(&pool, &new_title(&"t".repeat(90), 2020))
        .await
        .unwrap();
    assert_eq!(title.to_string(), "t".repeat(79));
}
