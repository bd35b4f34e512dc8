//! Diesel table definitions for the library schema.
//!
//! Kept in sync by hand with `backend/migrations`.

diesel::table! {
    users (uid) {
        uid -> Int4,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 20]
        student_id -> Varchar,
        #[max_length = 50]
        email -> Nullable<Varchar>,
        #[max_length = 50]
        phone -> Varchar,
    }
}

diesel::table! {
    books (bid) {
        bid -> Int4,
        #[max_length = 200]
        title -> Varchar,
        #[max_length = 100]
        author -> Varchar,
        #[max_length = 20]
        isbn -> Varchar,
        #[sql_name = "abstract"]
        summary -> Nullable<Text>,
        #[max_length = 50]
        area -> Nullable<Varchar>,
        #[max_length = 20]
        floor -> Nullable<Varchar>,
        tags -> Array<Text>,
        stock -> Int4,
    }
}

diesel::table! {
    book_inventory (inv_id) {
        inv_id -> Int4,
        book_id -> Int4,
        #[max_length = 100]
        location -> Varchar,
        quantity -> Int4,
    }
}

diesel::table! {
    orders (order_id) {
        #[max_length = 64]
        order_id -> Varchar,
        user_id -> Int4,
        book_id -> Int4,
        #[max_length = 100]
        location -> Varchar,
        #[max_length = 20]
        status -> Varchar,
        borrow_time -> Timestamptz,
        return_time -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(book_inventory -> books (book_id));
diesel::joinable!(orders -> books (book_id));
diesel::joinable!(orders -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(book_inventory, books, orders, users);
