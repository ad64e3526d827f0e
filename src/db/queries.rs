use chrono::{NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, ToSql};

use crate::models::{Booking, BookingWithHotel, Hotel, HotelSummary, PaymentStatus, RankedHotel};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

fn parse_datetime(idx: usize, s: String) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&s, DATETIME_FMT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ── Hotels ──

const HOTEL_COLUMNS: &str = "id, name, location, description, image, price, rating, reviews, stripe_price_id, embedding, created_at, updated_at";

fn hotel_from_row(row: &Row) -> rusqlite::Result<Hotel> {
    let embedding: Option<String> = row.get(9)?;
    Ok(Hotel {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        description: row.get(3)?,
        image: row.get(4)?,
        price: row.get(5)?,
        rating: row.get(6)?,
        reviews: row.get(7)?,
        stripe_price_id: row.get(8)?,
        embedding: embedding.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: parse_datetime(10, row.get(10)?)?,
        updated_at: parse_datetime(11, row.get(11)?)?,
    })
}

fn embedding_to_json(embedding: &Option<Vec<f32>>) -> anyhow::Result<Option<String>> {
    match embedding {
        Some(v) => Ok(Some(serde_json::to_string(v)?)),
        None => Ok(None),
    }
}

pub fn create_hotel(conn: &Connection, hotel: &Hotel) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO hotels (id, name, location, description, image, price, rating, reviews, stripe_price_id, embedding, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            hotel.id,
            hotel.name,
            hotel.location,
            hotel.description,
            hotel.image,
            hotel.price,
            hotel.rating,
            hotel.reviews,
            hotel.stripe_price_id,
            embedding_to_json(&hotel.embedding)?,
            format_datetime(&hotel.created_at),
            format_datetime(&hotel.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_hotel_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Hotel>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {HOTEL_COLUMNS} FROM hotels WHERE id = ?1"))?;
    match stmt.query_row(params![id], hotel_from_row) {
        Ok(hotel) => Ok(Some(hotel)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn order_clause(sort_by: Option<&str>) -> &'static str {
    // Whitelisted so client input never reaches the SQL string directly.
    match sort_by {
        Some("price_asc") => "price ASC",
        Some("price_desc") => "price DESC",
        Some("rating_asc") => "rating ASC",
        Some("rating_desc") => "rating DESC",
        Some("name_desc") => "name DESC",
        _ => "name ASC",
    }
}

pub fn list_hotels(
    conn: &Connection,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sort_by: Option<&str>,
) -> anyhow::Result<Vec<Hotel>> {
    let mut sql = format!("SELECT {HOTEL_COLUMNS} FROM hotels");
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    if let Some(min) = min_price {
        values.push(min);
        clauses.push(format!("price >= ?{}", values.len()));
    }
    if let Some(max) = max_price {
        values.push(max);
        clauses.push(format!("price <= ?{}", values.len()));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(order_clause(sort_by));

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
    let rows = stmt.query_map(param_refs.as_slice(), hotel_from_row)?;

    let mut hotels = Vec::new();
    for row in rows {
        hotels.push(row?);
    }
    Ok(hotels)
}

pub fn update_hotel(conn: &Connection, hotel: &Hotel) -> anyhow::Result<bool> {
    let changed = conn.execute(
        "UPDATE hotels SET name = ?2, location = ?3, description = ?4, image = ?5, price = ?6,
                rating = ?7, reviews = ?8, stripe_price_id = ?9, embedding = ?10, updated_at = ?11
         WHERE id = ?1",
        params![
            hotel.id,
            hotel.name,
            hotel.location,
            hotel.description,
            hotel.image,
            hotel.price,
            hotel.rating,
            hotel.reviews,
            hotel.stripe_price_id,
            embedding_to_json(&hotel.embedding)?,
            format_datetime(&hotel.updated_at),
        ],
    )?;
    Ok(changed > 0)
}

pub fn update_hotel_price(conn: &Connection, id: &str, price: f64) -> anyhow::Result<bool> {
    let now = format_datetime(&Utc::now().naive_utc());
    let changed = conn.execute(
        "UPDATE hotels SET price = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, price, now],
    )?;
    Ok(changed > 0)
}

pub fn delete_hotel(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let changed = conn.execute("DELETE FROM hotels WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Rank indexed hotels against a query vector, best match first.
/// Hotels without an embedding are never returned.
pub fn search_hotels(
    conn: &Connection,
    query: &[f32],
    limit: usize,
) -> anyhow::Result<Vec<RankedHotel>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {HOTEL_COLUMNS} FROM hotels WHERE embedding IS NOT NULL"
    ))?;
    let rows = stmt.query_map([], hotel_from_row)?;

    let mut ranked: Vec<RankedHotel> = Vec::new();
    for row in rows {
        let hotel = row?;
        let Some(embedding) = &hotel.embedding else {
            continue;
        };
        let score = cosine_similarity(query, embedding);
        ranked.push(RankedHotel {
            id: hotel.id,
            name: hotel.name,
            location: hotel.location,
            image: hotel.image,
            price: hotel.price,
            rating: hotel.rating,
            reviews: hotel.reviews,
            score,
        });
    }

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    Ok(ranked)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, user_id, hotel_id, check_in, check_out, room_number, payment_status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            booking.id,
            booking.user_id,
            booking.hotel_id,
            format_datetime(&booking.check_in),
            format_datetime(&booking.check_out),
            booking.room_number,
            booking.payment_status.as_str(),
            format_datetime(&booking.created_at),
            format_datetime(&booking.updated_at),
        ],
    )?;
    Ok(())
}

fn booking_from_row(row: &Row) -> rusqlite::Result<Booking> {
    let status: String = row.get(6)?;
    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        hotel_id: row.get(2)?,
        check_in: parse_datetime(3, row.get(3)?)?,
        check_out: parse_datetime(4, row.get(4)?)?,
        room_number: row.get(5)?,
        payment_status: PaymentStatus::from_str(&status),
        created_at: parse_datetime(7, row.get(7)?)?,
        updated_at: parse_datetime(8, row.get(8)?)?,
    })
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, hotel_id, check_in, check_out, room_number, payment_status, created_at, updated_at
         FROM bookings WHERE id = ?1",
    )?;
    match stmt.query_row(params![id], booking_from_row) {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_bookings(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<BookingWithHotel>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.user_id, b.hotel_id, b.check_in, b.check_out, b.room_number, b.payment_status,
                b.created_at, b.updated_at, h.id, h.name, h.location, h.image, h.price
         FROM bookings b
         JOIN hotels h ON h.id = b.hotel_id
         WHERE b.user_id = ?1
         ORDER BY b.check_in DESC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let booking = booking_from_row(row)?;
        Ok(BookingWithHotel {
            booking,
            hotel: HotelSummary {
                id: row.get(9)?,
                name: row.get(10)?,
                location: row.get(11)?,
                image: row.get(12)?,
                price: row.get(13)?,
            },
        })
    })?;

    let mut bookings = Vec::new();
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

/// Compare-and-swap on payment_status: the transition happens at most once
/// even when the webhook and the status poll race. Returns whether this call
/// performed it.
pub fn mark_booking_paid(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let now = format_datetime(&Utc::now().naive_utc());
    let changed = conn.execute(
        "UPDATE bookings SET payment_status = 'PAID', updated_at = ?2
         WHERE id = ?1 AND payment_status = 'PENDING'",
        params![id, now],
    )?;
    Ok(changed > 0)
}
