#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use berbind::{Time, asn_record};

asn_record! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Person {
        pub id: i64 => "integer",
        pub name: String => "utf8string",
        pub active: bool => "boolean",
        pub department: Option<String>
            => "printablestring,optional,tag:0",
        pub birthday: Option<Time> => "utctime,optional,tag:1",
        pub manager: Option<Box<Person>> => "sequence,optional,tag:2",
        pub permissions: Vec<String> => "sequence,optional,omitempty,tag:3",
        pub metadata: Bytes => "octetstring,optional,omitempty,tag:4",
    }
}

fuzz_target!(|data: &[u8]| {
    // Unmarshaling must never panic. Whatever it accepts must marshal
    // again and survive a second round trip unchanged.
    if let Ok(person) = berbind::from_ber::<Person>(data) {
        let encoded = berbind::marshal(&person).unwrap();
        let again: Person = berbind::from_ber(&encoded).unwrap();
        assert_eq!(again, person);
    }
});
