// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

pub const CINETPAY_HTTP_URL: &str = "https://api-checkout.cinetpay.com";
pub const CINETPAY_TRANSFER_HTTP_URL: &str = "https://client.cinetpay.com";

#[must_use]
pub fn payment_check_url(base_url: &str) -> String {
    format!("{}/v2/payment/check", base_url.trim_end_matches('/'))
}

#[must_use]
pub fn transfer_login_url(base_url: &str) -> String {
    format!("{}/v1/auth/login", base_url.trim_end_matches('/'))
}

#[must_use]
pub fn transfer_check_url(base_url: &str) -> String {
    format!("{}/v1/transfer/check/money", base_url.trim_end_matches('/'))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_urls_tolerate_trailing_slash() {
        assert_eq!(
            payment_check_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/v2/payment/check"
        );
        assert_eq!(
            transfer_check_url(CINETPAY_TRANSFER_HTTP_URL),
            "https://client.cinetpay.com/v1/transfer/check/money"
        );
    }
}
