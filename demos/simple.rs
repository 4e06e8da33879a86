use std::collections::HashMap;
use std::convert::Infallible;

use async_trait::async_trait;
use dataload_association::{BatchFunction, HasMany, HasOne, ManyToMany, QueryFunction};

#[derive(Debug, Clone, PartialEq)]
struct Film {
    id: i64,
    title: &'static str,
    director_id: i64,
}

#[derive(Debug, Clone)]
struct Casting {
    film_id: i64,
    actor: &'static str,
}

// For this example, the context is an in-memory table of films and castings.
struct Catalog {
    films: HashMap<i64, Film>,
    castings: Vec<Casting>,
}

struct FilmsById;

#[async_trait]
impl QueryFunction<i64, Film> for FilmsById {
    type Context = Catalog;
    type Error = Infallible;

    async fn query(&self, catalog: &Catalog, keys: &[i64]) -> Result<Vec<Film>, Infallible> {
        Ok(keys.iter().filter_map(|k| catalog.films.get(k).cloned()).collect())
    }
}

struct FilmsByDirector;

#[async_trait]
impl QueryFunction<i64, Film> for FilmsByDirector {
    type Context = Catalog;
    type Error = Infallible;

    async fn query(&self, catalog: &Catalog, keys: &[i64]) -> Result<Vec<Film>, Infallible> {
        Ok(catalog.films.values().filter(|f| keys.contains(&f.director_id)).cloned().collect())
    }
}

struct CastingsByFilm;

#[async_trait]
impl QueryFunction<i64, Casting> for CastingsByFilm {
    type Context = Catalog;
    type Error = Infallible;

    async fn query(&self, catalog: &Catalog, keys: &[i64]) -> Result<Vec<Casting>, Infallible> {
        Ok(catalog.castings.iter().filter(|c| keys.contains(&c.film_id)).cloned().collect())
    }
}

struct ActorsByName;

#[async_trait]
impl QueryFunction<&'static str, &'static str> for ActorsByName {
    type Context = Catalog;
    type Error = Infallible;

    async fn query(
        &self,
        _catalog: &Catalog,
        keys: &[&'static str],
    ) -> Result<Vec<&'static str>, Infallible> {
        Ok(keys.to_vec())
    }
}

#[tokio::main]
async fn main() {
    let film = |id, title, director_id| (id, Film { id, title, director_id });
    let catalog = Catalog {
        films: vec![
            film(2001, "a space odyssey", 1),
            film(7, "samurai", 2),
            film(12, "angry men", 3),
        ]
        .into_iter()
        .collect(),
        castings: vec![
            Casting { film_id: 12, actor: "Henry Fonda" },
            Casting { film_id: 12, actor: "Lee J. Cobb" },
            Casting { film_id: 7, actor: "Toshiro Mifune" },
        ],
    };

    let films = HasOne::new(FilmsById, |f: &Film| f.id);
    let results = films.load(&catalog, &[7, 15]).await;
    assert_eq!(results[0].as_ref().map(|f| f.title), Ok("samurai"));
    assert!(results[1].as_ref().unwrap_err().is_not_found());

    let by_director = HasMany::new(FilmsByDirector, |f: &Film| f.director_id)
        .with_sort(|films: &mut [Film]| films.sort_by_key(|f| f.id));
    let results = by_director.load(&catalog, &[1, 4]).await;
    assert_eq!(results[0].as_ref().map(Vec::len), Ok(1));
    assert_eq!(results[1].as_ref().map(Vec::len), Ok(0));

    let cast = ManyToMany::new(
        CastingsByFilm,
        ActorsByName,
        |c: &Casting| c.film_id,
        |c: &Casting| c.actor,
        |actor: &&'static str| *actor,
    )
    .with_sort(|actors: &mut [&'static str]| actors.sort());
    let results = cast.load(&catalog, &[12, 2001]).await;
    assert_eq!(results[0], Ok(vec!["Henry Fonda", "Lee J. Cobb"]));
    assert_eq!(results[1], Ok(vec![]));
}
