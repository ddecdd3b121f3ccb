use diesel::pg::PgConnection;
use diesel::prelude::*;
use dotenvy::dotenv;
use std::env;

/// Creates the test database when it does not exist yet
pub fn setup() {
    let db_url = database_url();

    if PgConnection::establish(&db_url).is_ok() {
        return;
    }

    let (db_name, server_url) = split_database_url(&db_url);
    let mut server_conn = connect_or_panic(&server_url);

    diesel::sql_query(format!(r#"CREATE DATABASE "{db_name}""#))
        .execute(&mut server_conn)
        .unwrap();
}

pub fn database_url() -> String {
    dotenv().ok();

    env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL env variable needs to be set.")
}

pub fn redis_url() -> String {
    dotenv().ok();

    env::var("TEST_REDIS_URL").expect("TEST_REDIS_URL env variable needs to be set.")
}

fn split_database_url(url: &str) -> (String, String) {
    let (server_url, db_name) = url
        .rsplit_once('/')
        .expect("TEST_DATABASE_URL must end with a database name");

    (db_name.to_string(), server_url.to_string())
}

fn connect_or_panic(db_url: &str) -> PgConnection {
    PgConnection::establish(db_url).unwrap_or_else(|_| panic!("Error connecting to {db_url}"))
}
