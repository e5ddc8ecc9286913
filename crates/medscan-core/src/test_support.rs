//! Fixture builders shared by unit tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::dictionary;
use lopdf::{Document, Object, ObjectId, Stream, StringFormat};
use md5::{Digest, Md5};

const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// Build a PDF with one page per entry, each line shown with a `Tj` operator.
pub fn pdf(pages: &[&[&str]]) -> Vec<u8> {
    save(document(pages))
}

/// Same layout as [`pdf`], encrypted with the standard security handler
/// (revision 4, 128-bit RC4) under `user_password`.
pub fn encrypted_pdf(pages: &[&[&str]], user_password: &str) -> Vec<u8> {
    let mut doc = document(pages);

    let owner = [0x4F_u8; 32];
    let file_id = *b"medscan-fixture!";
    let permissions: i64 = -4;

    let mut seed = padded_password(user_password.as_bytes());
    seed.extend_from_slice(&owner);
    seed.extend_from_slice(&(permissions as u32).to_le_bytes());
    seed.extend_from_slice(&file_id);
    let mut key = seed;
    for _ in 0..51 {
        key = Md5::digest(&key)[..16].to_vec();
    }

    let mut user = rc4(&key, &Md5::digest([&PASSWORD_PAD[..], &file_id[..]].concat()));
    for round in 1..=19u8 {
        let round_key: Vec<u8> = key.iter().map(|b| b ^ round).collect();
        user = rc4(&round_key, &user);
    }
    user.extend_from_slice(&PASSWORD_PAD[..16]);

    for (&id, object) in doc.objects.iter_mut() {
        if let Object::Stream(stream) = object {
            let sealed = rc4(&object_key(&key, id), &stream.content);
            stream.set_content(sealed);
        }
    }

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 4,
        "R" => 4,
        "Length" => 128,
        "CF" => dictionary! {
            "StdCF" => dictionary! {
                "CFM" => "V2",
                "Length" => 16,
                "AuthEvent" => "DocOpen",
            },
        },
        "StmF" => "StdCF",
        "StrF" => "StdCF",
        "O" => Object::String(owner.to_vec(), StringFormat::Hexadecimal),
        "U" => Object::String(user, StringFormat::Hexadecimal),
        "P" => permissions,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::String(file_id.to_vec(), StringFormat::Hexadecimal),
            Object::String(file_id.to_vec(), StringFormat::Hexadecimal),
        ],
    );

    save(doc)
}

fn padded_password(password: &[u8]) -> Vec<u8> {
    let len = password.len().min(32);
    let mut padded = password[..len].to_vec();
    padded.extend_from_slice(&PASSWORD_PAD[..32 - len]);
    padded
}

fn object_key(file_key: &[u8], id: ObjectId) -> Vec<u8> {
    let mut seed = file_key.to_vec();
    seed.extend_from_slice(&id.0.to_le_bytes()[..3]);
    seed.extend_from_slice(&id.1.to_le_bytes()[..2]);
    Md5::digest(&seed)[..16].to_vec()
}

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut state: [u8; 256] = std::array::from_fn(|i| i as u8);
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
        state.swap(i, j as usize);
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[i as usize]);
            state.swap(i as usize, j as usize);
            byte ^ state[state[i as usize].wrapping_add(state[j as usize]) as usize]
        })
        .collect()
}

fn document(pages: &[&[&str]]) -> Document {
    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for lines in pages {
        let mut content = String::new();
        for (i, line) in lines.iter().enumerate() {
            let escaped = line
                .replace('\\', "\\\\")
                .replace('(', "\\(")
                .replace(')', "\\)");
            let y = 700 - (i as i64) * 20;
            content.push_str(&format!("BT /F1 12 Tf 72 {y} Td ({escaped}) Tj ET\n"));
        }

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    "F1" => font_id,
                },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A small PNG payload.
pub fn png() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 255, 255])));
    let mut data = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}
