// Shelfmark
// Copyright 2025 The Shelfmark Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Tests for the book queries.

use super::*;

pub(crate) async fn test_books_create_and_get(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let details = BookDetails::new(
        "The Hobbit",
        "J. R. R. Tolkien",
        Some("An unlikely burglar joins a company of dwarves"),
        Some("9780547928227"),
        Some("Fantasy"),
        Some("1937-09-21"),
        Some("https://covers.example.com/hobbit.jpg"),
    )
    .unwrap();
    let id = create_book(&mut db.ex().await.unwrap(), &details, now).await.unwrap();

    assert_eq!(
        Book::with_details(id, &details, now),
        get_book(&mut db.ex().await.unwrap(), id).await.unwrap()
    );

    db.close().await;
}

pub(crate) async fn test_books_get_missing(db: Arc<dyn Db + Send + Sync>) {
    assert_eq!(
        DbError::NotFound,
        get_book(&mut db.ex().await.unwrap(), BookId::from_db(512).unwrap()).await.unwrap_err()
    );
    db.close().await;
}

pub(crate) async fn test_books_aggregates(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let book = make_book(&mut db.ex().await.unwrap(), "Reviewed", now).await;
    let user1 = make_user(&mut db.ex().await.unwrap(), "user1", now).await;
    let user2 = make_user(&mut db.ex().await.unwrap(), "user2", now).await;
    let user3 = make_user(&mut db.ex().await.unwrap(), "user3", now).await;

    make_review(&mut db.ex().await.unwrap(), book, *user1.id(), 1, now).await;
    make_review(&mut db.ex().await.unwrap(), book, *user2.id(), 1, now).await;
    make_review(&mut db.ex().await.unwrap(), book, *user3.id(), 2, now).await;

    let fetched = get_book(&mut db.ex().await.unwrap(), book).await.unwrap();
    assert_eq!(1.33, *fetched.average_rating());
    assert_eq!(3, *fetched.review_count());

    db.close().await;
}

pub(crate) async fn test_books_find_id_by_isbn(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let details = BookDetails::new(
        "The Hobbit",
        "J. R. R. Tolkien",
        None,
        Some("9780547928227"),
        None,
        None,
        None,
    )
    .unwrap();
    let id = create_book(&mut db.ex().await.unwrap(), &details, now).await.unwrap();

    assert_eq!(
        Some(id),
        find_book_id_by_isbn(&mut db.ex().await.unwrap(), &Isbn::new("9780547928227").unwrap())
            .await
            .unwrap()
    );
    assert_eq!(
        None,
        find_book_id_by_isbn(&mut db.ex().await.unwrap(), &Isbn::new("0547928220").unwrap())
            .await
            .unwrap()
    );

    match create_book(&mut db.ex().await.unwrap(), &details, now).await {
        Err(DbError::AlreadyExists) => (),
        e => panic!("Duplicate ISBN not detected: {:?}", e),
    }

    db.close().await;
}

pub(crate) async fn test_books_update(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);
    let later = now + Duration::minutes(5);

    let details = BookDetails::new(
        "The Hobbit",
        "J. R. R. Tolkien",
        Some("An unlikely burglar joins a company of dwarves"),
        Some("9780547928227"),
        Some("Fantasy"),
        Some("1937-09-21"),
        None,
    )
    .unwrap();
    let id = create_book(&mut db.ex().await.unwrap(), &details, now).await.unwrap();

    let details =
        BookDetails::new("New Title", "New Author", None, None, None, None, None).unwrap();
    update_book(&mut db.ex().await.unwrap(), id, &details, later).await.unwrap();

    let updated = get_book(&mut db.ex().await.unwrap(), id).await.unwrap();
    assert_eq!("New Title", updated.title());
    assert_eq!("New Author", updated.author());
    assert!(updated.description().is_none());
    assert!(updated.isbn().is_none());
    assert!(updated.genre().is_none());
    assert!(updated.published_date().is_none());
    assert_eq!(now, *updated.created_at());
    assert_eq!(later, *updated.updated_at());

    assert_eq!(
        DbError::NotFound,
        update_book(&mut db.ex().await.unwrap(), BookId::from_db(512).unwrap(), &details, later)
            .await
            .unwrap_err()
    );

    db.close().await;
}

pub(crate) async fn test_books_delete(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let id = make_book(&mut db.ex().await.unwrap(), "Doomed", now).await;

    delete_book(&mut db.ex().await.unwrap(), id).await.unwrap();
    assert_eq!(
        DbError::NotFound,
        get_book(&mut db.ex().await.unwrap(), id).await.unwrap_err()
    );
    assert_eq!(
        DbError::NotFound,
        delete_book(&mut db.ex().await.unwrap(), id).await.unwrap_err()
    );

    db.close().await;
}

pub(crate) async fn test_books_list_search(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let hobbit = create_book(
        &mut db.ex().await.unwrap(),
        &BookDetails::new(
            "The Hobbit",
            "J. R. R. Tolkien",
            Some("An unlikely burglar joins a company of dwarves"),
            Some("9780547928227"),
            None,
            None,
            None,
        )
        .unwrap(),
        now,
    )
    .await
    .unwrap();
    let dune = create_book(
        &mut db.ex().await.unwrap(),
        &BookDetails::new(
            "Dune",
            "Frank Herbert",
            Some("Politics and prophecy on Arrakis"),
            Some("9780441172719"),
            None,
            None,
            None,
        )
        .unwrap(),
        now,
    )
    .await
    .unwrap();

    let sort = BookSort::default();
    let page = PageRequest::new(1, 10);

    for (term, expected) in [
        ("hobbit", vec![hobbit]),
        ("HERBERT", vec![dune]),
        ("0441", vec![dune]),
        ("burglar", vec![hobbit]),
        ("nowhere-to-be-found", vec![]),
    ] {
        let filters = BookFilters::default().with_search(term);
        let books =
            list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
        assert_eq!(expected, book_ids(&books), "Searching for {}", term);
        assert_eq!(
            expected.len() as i64,
            count_books(&mut db.ex().await.unwrap(), &filters).await.unwrap(),
            "Counting matches of {}",
            term
        );
    }

    db.close().await;
}

pub(crate) async fn test_books_list_filters(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let dispossessed = make_book_by(
        &mut db.ex().await.unwrap(),
        "The Dispossessed",
        "Ursula K. Le Guin",
        "Fantasy",
        now,
    )
    .await;
    let hobbit =
        make_book_by(&mut db.ex().await.unwrap(), "The Hobbit", "J. R. R. Tolkien", "Fantasy", now)
            .await;
    let lathe = make_book_by(
        &mut db.ex().await.unwrap(),
        "The Lathe of Heaven",
        "Ursula K. Le Guin",
        "Science Fiction",
        now,
    )
    .await;

    let sort = BookSort::default();
    let page = PageRequest::new(1, 10);

    let filters = BookFilters::default().with_genre("Fantasy");
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![hobbit, dispossessed], book_ids(&books));

    // Genres match exactly, unlike the fuzzier author filter.
    let filters = BookFilters::default().with_genre("Fan");
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert!(books.is_empty());

    let filters = BookFilters::default().with_author("le guin");
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![lathe, dispossessed], book_ids(&books));

    let filters = BookFilters::default().with_genre("Fantasy").with_author("le guin");
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![dispossessed], book_ids(&books));
    assert_eq!(1, count_books(&mut db.ex().await.unwrap(), &filters).await.unwrap());

    db.close().await;
}

pub(crate) async fn test_books_list_rating_range(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let unrated = make_book(&mut db.ex().await.unwrap(), "Unrated", now).await;
    let low = make_book(&mut db.ex().await.unwrap(), "Low", now).await;
    let high = make_book(&mut db.ex().await.unwrap(), "High", now).await;

    let user1 = make_user(&mut db.ex().await.unwrap(), "user1", now).await;
    let user2 = make_user(&mut db.ex().await.unwrap(), "user2", now).await;
    make_review(&mut db.ex().await.unwrap(), low, *user1.id(), 2, now).await;
    make_review(&mut db.ex().await.unwrap(), high, *user1.id(), 4, now).await;
    make_review(&mut db.ex().await.unwrap(), high, *user2.id(), 5, now).await;

    let sort = BookSort::from_query(Some("title"), Some("asc"));
    let page = PageRequest::new(1, 10);

    // An explicit lower bound of zero still includes books with no reviews at all.
    let filters = BookFilters::default().with_min_rating(0.0);
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![high, low, unrated], book_ids(&books));

    let filters = BookFilters::default().with_min_rating(0.5);
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![high, low], book_ids(&books));

    let filters = BookFilters::default().with_min_rating(4.0);
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![high], book_ids(&books));

    let filters = BookFilters::default().with_max_rating(2.0);
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![low, unrated], book_ids(&books));

    let filters = BookFilters::default().with_min_rating(1.0).with_max_rating(3.0);
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![low], book_ids(&books));
    assert_eq!(1, count_books(&mut db.ex().await.unwrap(), &filters).await.unwrap());

    db.close().await;
}

pub(crate) async fn test_books_list_sort(db: Arc<dyn Db + Send + Sync>) {
    let t0 = datetime!(2024-06-10 14:30:00 UTC);

    let b = make_book(&mut db.ex().await.unwrap(), "B", t0).await;
    let a = make_book(&mut db.ex().await.unwrap(), "A", t0 + Duration::minutes(1)).await;
    let c = make_book(&mut db.ex().await.unwrap(), "C", t0 + Duration::minutes(2)).await;

    let user1 = make_user(&mut db.ex().await.unwrap(), "user1", t0).await;
    make_review(&mut db.ex().await.unwrap(), b, *user1.id(), 2, t0).await;
    make_review(&mut db.ex().await.unwrap(), c, *user1.id(), 5, t0).await;

    let filters = BookFilters::default();
    let page = PageRequest::new(1, 10);

    // The default sort is by creation time, newest first.
    let sort = BookSort::default();
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![c, a, b], book_ids(&books));

    let sort = BookSort::from_query(Some("title"), Some("asc"));
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![a, b, c], book_ids(&books));

    let sort = BookSort::from_query(Some("average_rating"), Some("asc"));
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![a, b, c], book_ids(&books));

    let sort = BookSort::from_query(Some("average_rating"), Some("desc"));
    let books = list_books(&mut db.ex().await.unwrap(), &filters, &sort, &page).await.unwrap();
    assert_eq!(vec![c, b, a], book_ids(&books));

    db.close().await;
}

pub(crate) async fn test_books_list_pagination(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let mut ids = vec![];
    for i in 1..=5 {
        ids.push(make_book(&mut db.ex().await.unwrap(), &format!("book{}", i), now).await);
    }

    let filters = BookFilters::default();
    let sort = BookSort::from_query(Some("title"), Some("asc"));

    let books =
        list_books(&mut db.ex().await.unwrap(), &filters, &sort, &PageRequest::new(1, 2))
            .await
            .unwrap();
    assert_eq!(&ids[0..2], book_ids(&books));

    let books =
        list_books(&mut db.ex().await.unwrap(), &filters, &sort, &PageRequest::new(2, 2))
            .await
            .unwrap();
    assert_eq!(&ids[2..4], book_ids(&books));

    let books =
        list_books(&mut db.ex().await.unwrap(), &filters, &sort, &PageRequest::new(3, 2))
            .await
            .unwrap();
    assert_eq!(&ids[4..5], book_ids(&books));

    let books =
        list_books(&mut db.ex().await.unwrap(), &filters, &sort, &PageRequest::new(4, 2))
            .await
            .unwrap();
    assert!(books.is_empty());

    assert_eq!(5, count_books(&mut db.ex().await.unwrap(), &filters).await.unwrap());

    db.close().await;
}

pub(crate) async fn test_books_related(db: Arc<dyn Db + Send + Sync>) {
    let now = datetime!(2024-06-10 14:30:00 UTC);

    let base = make_book_by(&mut db.ex().await.unwrap(), "Base", "A", "Fantasy", now).await;
    let peer_low = make_book_by(&mut db.ex().await.unwrap(), "Low", "B", "Fantasy", now).await;
    let peer_high = make_book_by(&mut db.ex().await.unwrap(), "High", "C", "Fantasy", now).await;
    let peer_unrated =
        make_book_by(&mut db.ex().await.unwrap(), "Unrated", "D", "Fantasy", now).await;
    let _other = make_book_by(&mut db.ex().await.unwrap(), "Other", "E", "Mystery", now).await;

    let user1 = make_user(&mut db.ex().await.unwrap(), "user1", now).await;
    make_review(&mut db.ex().await.unwrap(), peer_low, *user1.id(), 2, now).await;
    make_review(&mut db.ex().await.unwrap(), peer_high, *user1.id(), 5, now).await;

    let books =
        get_related_books(&mut db.ex().await.unwrap(), base, "Fantasy", 10).await.unwrap();
    assert_eq!(vec![peer_high, peer_low, peer_unrated], book_ids(&books));

    let books =
        get_related_books(&mut db.ex().await.unwrap(), base, "Fantasy", 2).await.unwrap();
    assert_eq!(vec![peer_high, peer_low], book_ids(&books));

    db.close().await;
}
