//! Entity builders shared by unit tests.

use multiverse_api::{Character, CharacterLocation, CharacterStatus, Episode, Gender};

pub fn character(id: i64, name: &str) -> Character {
    Character {
        id,
        name: name.to_string(),
        status: CharacterStatus::Alive,
        species: "Human".to_string(),
        kind: String::new(),
        gender: Gender::Male,
        origin: CharacterLocation {
            name: "Earth (C-137)".to_string(),
            url: "https://rickandmortyapi.com/api/location/1".to_string(),
        },
        location: CharacterLocation {
            name: "Citadel of Ricks".to_string(),
            url: "https://rickandmortyapi.com/api/location/3".to_string(),
        },
        image: format!("https://rickandmortyapi.com/api/character/avatar/{id}.jpeg"),
        episode: vec!["https://rickandmortyapi.com/api/episode/1".to_string()],
        url: format!("https://rickandmortyapi.com/api/character/{id}"),
        created: "2017-11-04T18:48:46.250Z".to_string(),
    }
}

pub fn episode(id: i64, name: &str) -> Episode {
    Episode {
        id,
        name: name.to_string(),
        air_date: "December 2, 2013".to_string(),
        episode: format!("S01E{id:02}"),
        characters: vec!["https://rickandmortyapi.com/api/character/1".to_string()],
        url: format!("https://rickandmortyapi.com/api/episode/{id}"),
        created: "2017-11-10T12:56:33.798Z".to_string(),
    }
}
